//! View reconciliation
//!
//! Maps the latest server-reported [`IngestionStatus`] onto the state of the
//! operator controls. The mapping is pure and total: no I/O, no hidden state,
//! and every input produces a configuration.
//!
//! `is_running` and `is_paused` are read independently. The backend can report
//! `is_paused` without `is_running`; that still renders as paused with resume
//! available.

use fds_common::types::IngestionStatus;
use serde::Serialize;

/// Status indicator class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DotClass {
    Running,
    Paused,
    Idle,
}

impl DotClass {
    pub fn as_str(self) -> &'static str {
        match self {
            DotClass::Running => "running",
            DotClass::Paused => "paused",
            DotClass::Idle => "idle",
        }
    }
}

/// Desired configuration of the status indicator and the loop controls
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlConfig {
    pub dot_class: DotClass,
    pub status_text: String,
    pub pause_enabled: bool,
    pub resume_enabled: bool,
    pub start_enabled: bool,
    /// Always within `0.0..=100.0`
    pub progress_percent: f64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        reconcile(&IngestionStatus::default())
    }
}

/// Derive the control configuration from a status snapshot.
pub fn reconcile(status: &IngestionStatus) -> ControlConfig {
    let running = status.is_running && !status.is_paused;

    let dot_class = if running {
        DotClass::Running
    } else if status.is_paused {
        DotClass::Paused
    } else {
        DotClass::Idle
    };

    let status_text = match (dot_class, status.current_table.as_deref()) {
        (DotClass::Running, Some(table)) if !table.is_empty() => format!("Running: {}", table),
        (DotClass::Running, _) => "Running".to_string(),
        (DotClass::Paused, _) => "Paused".to_string(),
        (DotClass::Idle, _) => "Idle".to_string(),
    };

    ControlConfig {
        dot_class,
        status_text,
        pause_enabled: running,
        resume_enabled: status.is_paused,
        start_enabled: !status.is_running && status.summary.pending > 0,
        progress_percent: progress_percent(status.summary.completed, status.summary.total_discovered),
    }
}

/// Completed share of discovered tables, clamped to `[0, 100]`.
pub fn progress_percent(completed: u64, total_discovered: u64) -> f64 {
    if total_discovered == 0 {
        return 0.0;
    }
    let pct = completed as f64 / total_discovered as f64 * 100.0;
    pct.clamp(0.0, 100.0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use fds_common::types::Summary;
    use proptest::prelude::*;

    fn status(is_running: bool, is_paused: bool, pending: u64) -> IngestionStatus {
        IngestionStatus {
            is_running,
            is_paused,
            current_table: None,
            summary: Summary {
                pending,
                ..Summary::default()
            },
        }
    }

    #[test]
    fn test_running() {
        let config = reconcile(&status(true, false, 3));
        assert_eq!(config.dot_class, DotClass::Running);
        assert!(config.pause_enabled);
        assert!(!config.resume_enabled);
        assert!(!config.start_enabled);
        assert_eq!(config.status_text, "Running");
    }

    #[test]
    fn test_running_shows_current_table() {
        let mut s = status(true, false, 0);
        s.current_table = Some("AP_INVOICES_ALL".to_string());
        assert_eq!(reconcile(&s).status_text, "Running: AP_INVOICES_ALL");
    }

    #[test]
    fn test_paused_while_running() {
        let config = reconcile(&status(true, true, 3));
        assert_eq!(config.dot_class, DotClass::Paused);
        assert!(!config.pause_enabled);
        assert!(config.resume_enabled);
        assert!(!config.start_enabled);
    }

    #[test]
    fn test_paused_without_running() {
        let config = reconcile(&status(false, true, 3));
        assert_eq!(config.dot_class, DotClass::Paused);
        assert!(config.resume_enabled);
        assert!(!config.pause_enabled);
        assert!(config.start_enabled);
    }

    #[test]
    fn test_start_enabled_needs_pending() {
        assert!(reconcile(&status(false, false, 5)).start_enabled);
        assert!(!reconcile(&status(false, false, 0)).start_enabled);
    }

    #[test]
    fn test_idle_default() {
        let config = ControlConfig::default();
        assert_eq!(config.dot_class, DotClass::Idle);
        assert_eq!(config.status_text, "Idle");
        assert_eq!(config.progress_percent, 0.0);
    }

    #[test]
    fn test_progress() {
        assert_eq!(progress_percent(0, 0), 0.0);
        assert_eq!(progress_percent(5, 0), 0.0);
        assert_eq!(progress_percent(1, 4), 25.0);
        assert_eq!(progress_percent(8, 4), 100.0);
    }

    fn any_status() -> impl Strategy<Value = IngestionStatus> {
        (
            any::<bool>(),
            any::<bool>(),
            proptest::option::of("[A-Z_]{0,12}"),
            any::<u64>(),
            any::<u64>(),
            any::<u64>(),
        )
            .prop_map(|(is_running, is_paused, current_table, total, completed, pending)| {
                IngestionStatus {
                    is_running,
                    is_paused,
                    current_table,
                    summary: Summary {
                        total_discovered: total,
                        completed,
                        pending,
                        ..Summary::default()
                    },
                }
            })
    }

    proptest! {
        #[test]
        fn prop_reconcile_is_idempotent(s in any_status()) {
            prop_assert_eq!(reconcile(&s), reconcile(&s));
        }

        #[test]
        fn prop_progress_in_range(s in any_status()) {
            let pct = reconcile(&s).progress_percent;
            prop_assert!(!pct.is_nan());
            prop_assert!((0.0..=100.0).contains(&pct));
        }

        #[test]
        fn prop_running_enables_pause_only(s in any_status()) {
            let mut s = s;
            s.is_running = true;
            s.is_paused = false;
            let config = reconcile(&s);
            prop_assert!(config.pause_enabled);
            prop_assert!(!config.resume_enabled);
            prop_assert_eq!(config.dot_class, DotClass::Running);
        }

        #[test]
        fn prop_paused_enables_resume(s in any_status()) {
            let mut s = s;
            s.is_paused = true;
            let config = reconcile(&s);
            prop_assert!(config.resume_enabled);
            prop_assert_eq!(config.dot_class, DotClass::Paused);
        }

        #[test]
        fn prop_start_rule(s in any_status()) {
            let config = reconcile(&s);
            prop_assert_eq!(config.start_enabled, !s.is_running && s.summary.pending > 0);
        }
    }
}
