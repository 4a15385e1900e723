//! `fds ingest` and `fds ingest-by-name` command implementations

use super::Console;
use crate::error::Result;
use crate::render;
use crate::tables::TableWorkflow;
use fds_common::types::DiscoveredTable;

/// Ingest one table from its documentation URL.
pub async fn single(console: &Console, table_name: &str, table_url: &str) -> Result<()> {
    let workflow = TableWorkflow::new(console.dispatcher.clone());
    let table = DiscoveredTable {
        table_name: table_name.to_string(),
        table_url: table_url.to_string(),
        ..Default::default()
    };

    let outcome = workflow.ingest_single(&table).await?;
    print!("{}", render::render_outcome(&outcome.command));
    print!("{}", render::render_indicator(&console.view().controls()));
    Ok(())
}

/// Ingest a discovered table looked up by name on the server.
pub async fn by_name(console: &Console, table_name: &str) -> Result<()> {
    let workflow = TableWorkflow::new(console.dispatcher.clone());
    let outcome = workflow.ingest_by_name(table_name).await?;
    print!("{}", render::render_outcome(&outcome));
    print!("{}", render::render_indicator(&console.view().controls()));
    Ok(())
}
