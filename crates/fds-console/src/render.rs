//! Terminal rendering
//!
//! The only module that knows how things look. Everything here turns view
//! models into strings; printing is left to the commands.

use crate::dispatcher::CommandOutcome;
use crate::error::{ConsoleError, Presentation};
use crate::reconcile::{ControlConfig, DotClass};
use crate::tables::{GroupKind, SearchView};
use crate::view::{Control, ViewState};
use colored::Colorize;
use comfy_table::{presets::UTF8_BORDERS_ONLY, Table};
use fds_common::types::{LogEntry, LogLevel, Summary};
use std::fmt::Write;

const PROGRESS_WIDTH: usize = 30;

/// Controls shown on the status panel, in display order
const PANEL_CONTROLS: [Control; 6] = [
    Control::Discover,
    Control::Start,
    Control::Pause,
    Control::Resume,
    Control::RetryFailed,
    Control::Reset,
];

fn dot(class: DotClass) -> String {
    match class {
        DotClass::Running => "●".green().to_string(),
        DotClass::Paused => "●".yellow().to_string(),
        DotClass::Idle => "●".dimmed().to_string(),
    }
}

/// `[#########---------]  45.0%`
pub fn progress_bar(percent: f64) -> String {
    let percent = if percent.is_finite() {
        percent.clamp(0.0, 100.0)
    } else {
        0.0
    };
    let filled = ((percent / 100.0) * PROGRESS_WIDTH as f64).round() as usize;
    format!(
        "[{}{}] {:5.1}%",
        "#".repeat(filled).cyan(),
        "-".repeat(PROGRESS_WIDTH - filled),
        percent
    )
}

/// Indicator, status text and progress bar
pub fn render_indicator(controls: &ControlConfig) -> String {
    format!(
        "{} {}\n{}\n",
        dot(controls.dot_class),
        controls.status_text.bold(),
        progress_bar(controls.progress_percent)
    )
}

pub fn render_summary(summary: &Summary) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY).set_header(vec![
        "Discovered",
        "Completed",
        "Pending",
        "Failed",
        "Tables",
        "Columns",
    ]);
    table.add_row(vec![
        summary.total_discovered.to_string(),
        summary.completed.to_string(),
        summary.pending.to_string(),
        summary.failed.to_string(),
        summary.tables_ingested.to_string(),
        summary.columns_ingested.to_string(),
    ]);

    let mut out = format!("{}\n", table);
    if let Some(ref last) = summary.last_processed_table {
        let _ = writeln!(out, "Last processed: {}", last.cyan());
    }
    out
}

/// Enabled/disabled state of the loop controls
pub fn render_controls(state: &ViewState) -> String {
    PANEL_CONTROLS
        .iter()
        .map(|&control| {
            if state.in_flight.contains(&control) {
                format!("{} …", control).yellow().to_string()
            } else if state.is_enabled(control) {
                format!("[{}]", control).bold().to_string()
            } else {
                format!("[{}]", control).dimmed().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Status panel: indicator, counters, controls
pub fn render_status(state: &ViewState) -> String {
    let mut out = render_indicator(&state.controls);
    match state.status {
        Some(ref status) => out.push_str(&render_summary(&status.summary)),
        None => out.push_str(&format!("{}\n", "Waiting for status…".dimmed())),
    }
    let _ = writeln!(out, "{}", render_controls(state));
    out
}

fn log_time(entry: &LogEntry) -> String {
    match (entry.instant(), entry.timestamp.as_deref()) {
        (Some(instant), _) => instant.format("%H:%M:%S").to_string(),
        (None, Some(raw)) => raw.to_string(),
        (None, None) => "--:--:--".to_string(),
    }
}

/// Log panel, in received order
pub fn render_logs(logs: &[LogEntry]) -> String {
    if logs.is_empty() {
        return format!("{}\n", "No log entries.".dimmed());
    }

    let mut out = String::new();
    for entry in logs {
        let level = match entry.level {
            LogLevel::Info => entry.level.as_str().blue(),
            LogLevel::Warn => entry.level.as_str().yellow(),
            LogLevel::Error => entry.level.as_str().red(),
            LogLevel::Other(_) => entry.level.as_str().normal(),
        };
        let _ = writeln!(
            out,
            "{} {:<5} {}",
            log_time(entry).dimmed(),
            level,
            entry.message
        );
    }
    out
}

/// Grouped search result with inline ingest hints
pub fn render_search(view: &SearchView) -> String {
    if view.is_empty() {
        return format!("{}\n", "No matching tables found.".dimmed());
    }

    let mut out = String::new();
    for group in &view.groups {
        let _ = writeln!(
            out,
            "{} ({})",
            group.kind.title().cyan().bold(),
            group.rows.len()
        );
        for row in &group.rows {
            match group.kind {
                GroupKind::AlreadyIngested => {
                    let _ = writeln!(out, "  {} {}", "✓".green(), row.table_name);
                }
                GroupKind::Discovered => {
                    let status = row.status.as_deref().unwrap_or_default();
                    let _ = write!(out, "  {:<32} {:<12}", row.table_name, status);
                    if let Some(ref detail) = row.detail {
                        let _ = write!(out, " {}", detail.dimmed());
                    }
                    if let Some(ref table) = row.ingest {
                        let _ = write!(
                            out,
                            "\n    {} fds ingest {} {}",
                            "↳".yellow(),
                            table.table_name,
                            table.table_url
                        );
                    }
                    out.push('\n');
                }
            }
        }
    }
    out
}

pub fn render_outcome(outcome: &CommandOutcome) -> String {
    format!("{} {}\n", "✓".green(), outcome.message)
}

/// Error text for the chosen presentation; `None` when it should stay silent.
pub fn render_error(err: &ConsoleError, presentation: Presentation) -> Option<String> {
    match presentation {
        Presentation::Silent => None,
        Presentation::Inline => Some(format!("{} {}\n", "!".yellow().bold(), err)),
        Presentation::Blocking => Some(format!("{} {}\n", "✗ Error:".red().bold(), err)),
    }
}

/// Full dashboard frame for `fds watch`
pub fn render_dashboard(state: &ViewState, server_url: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {}\n",
        "Fusion schema ingestion".bold(),
        server_url.dimmed()
    );
    out.push_str(&render_status(state));
    let _ = writeln!(out, "\n{}", "Logs".cyan().bold());
    out.push_str(&render_logs(&state.logs));
    let _ = writeln!(out, "\n{}", "Press Ctrl-C to quit.".dimmed());
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::ActionClass;
    use crate::tables::SearchOutcome;
    use fds_common::types::{DiscoveredTable, IngestedTableRef, IngestionStatus, TableStatus};

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_progress_bar_bounds() {
        plain();
        assert!(progress_bar(0.0).ends_with("  0.0%"));
        assert!(progress_bar(100.0).contains(&"#".repeat(PROGRESS_WIDTH)));
        assert!(progress_bar(f64::NAN).ends_with("  0.0%"));
        assert!(progress_bar(250.0).ends_with("100.0%"));
    }

    #[test]
    fn test_status_panel() {
        plain();
        let mut state = ViewState::default();
        state.status = Some(IngestionStatus {
            is_running: true,
            current_table: Some("GL_LEDGERS".to_string()),
            ..Default::default()
        });
        state.controls = crate::reconcile::reconcile(state.status.as_ref().unwrap());

        let out = render_status(&state);
        assert!(out.contains("Running: GL_LEDGERS"));
        assert!(out.contains("[pause]"));
        assert!(out.contains("Discovered"));
    }

    #[test]
    fn test_in_flight_control_marked() {
        plain();
        let mut state = ViewState::default();
        state.in_flight.insert(Control::Reset);
        assert!(render_controls(&state).contains("reset …"));
    }

    #[test]
    fn test_logs_in_received_order() {
        plain();
        let logs = vec![
            LogEntry {
                timestamp: Some("Mon, 06 Jan 2025 10:00:02 GMT".to_string()),
                level: LogLevel::Error,
                message: "second".to_string(),
            },
            LogEntry {
                timestamp: None,
                level: LogLevel::Info,
                message: "first".to_string(),
            },
        ];
        let out = render_logs(&logs);
        assert!(out.find("second").unwrap() < out.find("first").unwrap());
        assert!(out.contains("10:00:02"));
        assert!(out.contains("--:--:--"));
    }

    #[test]
    fn test_search_ingested_only() {
        plain();
        let outcome = SearchOutcome {
            query: "orders".to_string(),
            discovered: vec![],
            ingested: vec![IngestedTableRef {
                table_name: "orders".to_string(),
            }],
        };
        let out = render_search(&SearchView::from(&outcome));
        assert!(out.contains("Already Ingested (1)"));
        assert!(!out.contains("Discovered"));
        assert!(!out.contains("fds ingest"));
    }

    #[test]
    fn test_search_trigger_for_pending() {
        plain();
        let outcome = SearchOutcome {
            query: "ap".to_string(),
            discovered: vec![DiscoveredTable {
                table_name: "AP_INVOICES_ALL".to_string(),
                table_url: "https://docs.oracle.com/oedmf/apinvoicesall.html".to_string(),
                status: TableStatus::Pending,
                ..Default::default()
            }],
            ingested: vec![],
        };
        let out = render_search(&SearchView::from(&outcome));
        assert!(out.contains(
            "fds ingest AP_INVOICES_ALL https://docs.oracle.com/oedmf/apinvoicesall.html"
        ));
    }

    #[test]
    fn test_render_error_presentations() {
        plain();
        let err = ConsoleError::application("Table FOO not found in discovered tables.");
        assert!(render_error(&err, err.presentation(ActionClass::Polling)).is_none());
        assert!(render_error(&err, err.presentation(ActionClass::Search))
            .unwrap()
            .starts_with("!"));
        assert!(render_error(&err, err.presentation(ActionClass::Command))
            .unwrap()
            .starts_with("✗ Error:"));
    }
}
