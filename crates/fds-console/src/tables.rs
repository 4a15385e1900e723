//! Table workflow: search, grouped results, single-table ingest
//!
//! A search result is a snapshot. It is never polled; after a successful
//! single-table ingest the last search is simply run again.

use crate::api;
use crate::dispatcher::{CommandDispatcher, CommandOutcome};
use crate::error::{ConsoleError, Result};
use crate::view::Control;
use fds_common::types::{DiscoveredTable, IngestedTableRef};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

/// Tables matching one search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOutcome {
    pub query: String,
    pub discovered: Vec<DiscoveredTable>,
    pub ingested: Vec<IngestedTableRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    AlreadyIngested,
    Discovered,
}

impl GroupKind {
    pub fn title(self) -> &'static str {
        match self {
            GroupKind::AlreadyIngested => "Already Ingested",
            GroupKind::Discovered => "Discovered",
        }
    }
}

/// One rendered row. `ingest` is the inline trigger, present only for
/// discovered tables that are not ingested yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRow {
    pub table_name: String,
    pub status: Option<String>,
    pub detail: Option<String>,
    pub ingest: Option<DiscoveredTable>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchGroup {
    pub kind: GroupKind,
    pub rows: Vec<SearchRow>,
}

/// Display model of a search: already-ingested group first, then discovered.
/// Empty groups are left out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchView {
    pub groups: Vec<SearchGroup>,
}

impl SearchView {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn group(&self, kind: GroupKind) -> Option<&SearchGroup> {
        self.groups.iter().find(|g| g.kind == kind)
    }

    /// Rows that carry an ingest trigger
    pub fn triggers(&self) -> impl Iterator<Item = &DiscoveredTable> {
        self.groups
            .iter()
            .flat_map(|g| g.rows.iter())
            .filter_map(|r| r.ingest.as_ref())
    }
}

impl From<&SearchOutcome> for SearchView {
    fn from(outcome: &SearchOutcome) -> Self {
        let mut groups = Vec::with_capacity(2);

        if !outcome.ingested.is_empty() {
            groups.push(SearchGroup {
                kind: GroupKind::AlreadyIngested,
                rows: outcome
                    .ingested
                    .iter()
                    .map(|t| SearchRow {
                        table_name: t.table_name.clone(),
                        status: None,
                        detail: None,
                        ingest: None,
                    })
                    .collect(),
            });
        }

        if !outcome.discovered.is_empty() {
            groups.push(SearchGroup {
                kind: GroupKind::Discovered,
                rows: outcome
                    .discovered
                    .iter()
                    .map(|t| SearchRow {
                        table_name: t.table_name.clone(),
                        status: Some(t.status.to_string()),
                        detail: t.error_message.clone().or_else(|| t.module.clone()),
                        ingest: (!t.status.is_ingested()).then(|| t.clone()),
                    })
                    .collect(),
            });
        }

        SearchView { groups }
    }
}

/// Result of a single-table ingest
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub command: CommandOutcome,
    /// The last search, run again; `None` if there was none or it failed
    pub search: Option<SearchOutcome>,
}

pub struct TableWorkflow {
    dispatcher: Arc<CommandDispatcher>,
    last_search: Mutex<Option<String>>,
}

impl TableWorkflow {
    pub fn new(dispatcher: Arc<CommandDispatcher>) -> Self {
        Self {
            dispatcher,
            last_search: Mutex::new(None),
        }
    }

    pub fn last_search(&self) -> Option<String> {
        self.last_search
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Search discovered and ingested tables by (partial) name.
    pub async fn search(&self, table_name: &str) -> Result<SearchOutcome> {
        let query = table_name.trim();
        if query.is_empty() {
            return Err(ConsoleError::validation("Please enter a table name"));
        }

        let view = self.dispatcher.view();
        let _guard = view
            .try_acquire(Control::Search)
            .ok_or(ConsoleError::Busy(Control::Search))?;

        let reply = api::search_table(self.dispatcher.transport().as_ref(), query).await?;
        *self
            .last_search
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(query.to_string());
        debug!(
            query,
            discovered = reply.discovered.len(),
            ingested = reply.ingested.len(),
            "Search finished"
        );

        Ok(SearchOutcome {
            query: query.to_string(),
            discovered: reply.discovered,
            ingested: reply.ingested,
        })
    }

    /// Ingest one discovered table, then re-run the last search.
    pub async fn ingest_single(&self, table: &DiscoveredTable) -> Result<IngestOutcome> {
        let command = self
            .dispatcher
            .ingest_single(&table.table_url, &table.table_name)
            .await?;

        let search = match self.last_search() {
            Some(query) => match self.search(&query).await {
                Ok(outcome) => Some(outcome),
                Err(e) => {
                    warn!(query = %query, error = %e, "Search refresh after ingest failed");
                    None
                }
            },
            None => None,
        };

        Ok(IngestOutcome { command, search })
    }

    /// Resolve a table by name on the backend and ingest it.
    pub async fn ingest_by_name(&self, table_name: &str) -> Result<CommandOutcome> {
        self.dispatcher.ingest_by_name(table_name).await
    }
}
