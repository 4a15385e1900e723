//! `fds search` command implementation
//!
//! Prints the grouped result. Tables that are not ingested yet come with the
//! `fds ingest` line that ingests them. On a terminal the operator can also
//! pick one of those tables right away; after each ingest the search runs
//! again and the refreshed result is shown.

use super::Console;
use crate::error::{ActionClass, Result};
use crate::render;
use crate::tables::{SearchOutcome, SearchView, TableWorkflow};
use colored::Colorize;
use fds_common::types::DiscoveredTable;
use std::io::IsTerminal;
use tracing::debug;

/// Chooses which ingestable table to ingest next; `None` ends the session.
pub trait TablePicker: Send + Sync {
    fn pick(&self, tables: &[DiscoveredTable]) -> Option<usize>;
}

/// Interactive selection menu
pub struct InquirePicker;

impl TablePicker for InquirePicker {
    fn pick(&self, tables: &[DiscoveredTable]) -> Option<usize> {
        use inquire::Select;

        let mut options: Vec<String> = tables
            .iter()
            .map(|t| format!("{} ({})", t.table_name.cyan(), t.status))
            .collect();
        options.push(format!("{}", "✕ Done".red()));
        let done = options.len() - 1;

        Select::new("Ingest a table:", options)
            .with_page_size(15)
            .raw_prompt()
            .ok()
            .map(|choice| choice.index)
            .filter(|&index| index != done)
    }
}

pub async fn run(console: &Console, table_name: &str) -> Result<()> {
    let workflow = TableWorkflow::new(console.dispatcher.clone());
    let outcome = workflow.search(table_name).await?;
    print_results(&outcome);

    if std::io::stdout().is_terminal() && std::io::stdin().is_terminal() {
        browse(&workflow, outcome, &InquirePicker).await;
    }
    Ok(())
}

fn print_results(outcome: &SearchOutcome) {
    println!(
        "{} '{}'\n",
        "Search results for".cyan().bold(),
        outcome.query
    );
    print!("{}", render::render_search(&SearchView::from(outcome)));
}

/// Offer the ingest triggers of `outcome` until the picker stops or nothing
/// is left to ingest. Returns the latest search result.
pub async fn browse(
    workflow: &TableWorkflow,
    mut outcome: SearchOutcome,
    picker: &dyn TablePicker,
) -> SearchOutcome {
    loop {
        let triggers: Vec<DiscoveredTable> =
            SearchView::from(&outcome).triggers().cloned().collect();
        if triggers.is_empty() {
            break;
        }
        let Some(table) = picker.pick(&triggers).and_then(|i| triggers.get(i)) else {
            break;
        };

        debug!(table = %table.table_name, "Ingesting from search");
        match workflow.ingest_single(table).await {
            Ok(ingest) => {
                println!();
                print!("{}", render::render_outcome(&ingest.command));
                if let Some(refreshed) = ingest.search {
                    println!();
                    print_results(&refreshed);
                    outcome = refreshed;
                }
            }
            Err(e) => {
                if let Some(text) = render::render_error(&e, e.presentation(ActionClass::Command)) {
                    eprint!("{}", text);
                }
            }
        }
    }
    outcome
}
