//! FDS Console Library
//!
//! Operator console for the Oracle Fusion schema ingestion server.
//!
//! # Overview
//!
//! The backend crawls Oracle's published table documentation, stores table
//! and column metadata, and exposes a small JSON API. This crate drives that
//! API from the terminal:
//!
//! - **Live dashboard**: poll status and logs on a timer (`fds watch`)
//! - **Loop control**: discover, start, pause, resume, retry, reset
//! - **Table workflow**: search tables and ingest one on demand (`fds search`, `fds ingest`)
//! - **Ad-hoc queries**: run read-only SQL against the metadata store (`fds query`)
//!
//! The backend is authoritative for all state. The console keeps a local
//! [`view::ConsoleView`] that is reconciled from polled status and updated
//! optimistically after commands.

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod api;
pub mod commands;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod poller;
pub mod query;
pub mod reconcile;
pub mod render;
pub mod tables;
pub mod view;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::Config;
pub use error::{ConsoleError, Result};

use clap::{Parser, Subcommand};

/// FDS - Fusion schema ingestion console
#[derive(Parser, Debug)]
#[command(name = "fds")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Ingestion server URL (overrides the config file)
    #[arg(long, env = "FDS_SERVER_URL", global = true)]
    pub server_url: Option<String>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Live dashboard: status, progress, controls and logs
    Watch,

    /// Show ingestion status and progress once
    Status,

    /// Show the newest log lines
    Logs {
        /// Number of lines (defaults to the configured log limit)
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Discover tables from a table-of-contents URL
    Discover {
        /// Documentation TOC URL
        toc_url: String,
    },

    /// Start ingesting pending tables
    Start,

    /// Pause the ingestion loop
    Pause,

    /// Resume a paused ingestion loop
    Resume,

    /// Reset failed tables to pending
    Retry,

    /// Delete all ingested data and mark every table pending
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Search discovered and ingested tables by name
    Search {
        /// Table name or part of one
        table_name: String,
    },

    /// Ingest a single table from its documentation URL
    Ingest {
        /// Table name
        table_name: String,

        /// Table documentation URL
        table_url: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Ingest a single discovered table, looked up by name on the server
    IngestByName {
        /// Table name
        table_name: String,
    },

    /// Run a read-only SQL query against the metadata store
    Query {
        /// SQL statement
        sql: String,

        /// Output format (table, json, csv, tsv)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
}

impl Commands {
    /// How errors from this command are presented
    pub fn action_class(&self) -> error::ActionClass {
        match self {
            Commands::Search { .. } => error::ActionClass::Search,
            Commands::Query { .. } => error::ActionClass::Query,
            _ => error::ActionClass::Command,
        }
    }
}
