//! Shared pieces of the `fds` workspace
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! - **Types**: the JSON contract of the ingestion backend
//! - **Logging**: subscriber setup used by every binary

pub mod logging;
pub mod types;

pub use types::{
    DiscoveredTable, IngestedTableRef, IngestionStatus, LogEntry, QueryResult, Summary,
    TableStatus,
};
