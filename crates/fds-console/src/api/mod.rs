//! API client module
//!
//! Transport to the ingestion backend and typed wrappers for each endpoint.

pub mod client;
pub mod endpoints;

pub use client::{
    fetch_logs, fetch_status, post_command, run_query, search_table, ApiClient, Method, Transport,
};
pub use fds_common::types::*;
