//! Shared console view state
//!
//! Holds what the operator currently sees: the last status and its reconciled
//! control configuration, the log tail, and which controls are disabled
//! because their request is in flight. Writers are the poller ticks and the
//! command dispatcher; the last write wins. Every write bumps a generation
//! counter that renderers can watch.

use crate::reconcile::{reconcile, ControlConfig};
use fds_common::types::{IngestionStatus, LogEntry};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};
use tokio::sync::watch;

/// An operator control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Control {
    Discover,
    Start,
    Pause,
    Resume,
    RetryFailed,
    Reset,
    Search,
    IngestSingle,
    IngestByName,
    RunQuery,
}

impl Control {
    pub const ALL: [Control; 10] = [
        Control::Discover,
        Control::Start,
        Control::Pause,
        Control::Resume,
        Control::RetryFailed,
        Control::Reset,
        Control::Search,
        Control::IngestSingle,
        Control::IngestByName,
        Control::RunQuery,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Control::Discover => "discover",
            Control::Start => "start",
            Control::Pause => "pause",
            Control::Resume => "resume",
            Control::RetryFailed => "retry-failed",
            Control::Reset => "reset",
            Control::Search => "search",
            Control::IngestSingle => "ingest-single",
            Control::IngestByName => "ingest-by-name",
            Control::RunQuery => "run-query",
        }
    }

    /// Whether the control changes backend state
    pub fn is_mutating(self) -> bool {
        !matches!(self, Control::Search | Control::RunQuery)
    }
}

impl std::fmt::Display for Control {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time copy of the view
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub status: Option<IngestionStatus>,
    pub controls: ControlConfig,
    pub logs: Vec<LogEntry>,
    pub in_flight: HashSet<Control>,
    pub status_updates: u64,
    pub log_updates: u64,
}

impl ViewState {
    /// Whether the control can be triggered right now.
    pub fn is_enabled(&self, control: Control) -> bool {
        if self.in_flight.contains(&control) {
            return false;
        }
        match control {
            Control::Start => self.controls.start_enabled,
            Control::Pause => self.controls.pause_enabled,
            Control::Resume => self.controls.resume_enabled,
            _ => true,
        }
    }
}

pub struct ConsoleView {
    state: RwLock<ViewState>,
    changed: watch::Sender<u64>,
}

impl Default for ConsoleView {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleView {
    pub fn new() -> Self {
        let (changed, _) = watch::channel(0);
        Self {
            state: RwLock::new(ViewState::default()),
            changed,
        }
    }

    fn update<R>(&self, f: impl FnOnce(&mut ViewState) -> R) -> R {
        let result = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            f(&mut state)
        };
        self.changed.send_modify(|generation| *generation += 1);
        result
    }

    pub fn snapshot(&self) -> ViewState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn controls(&self) -> ControlConfig {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .controls
            .clone()
    }

    pub fn is_enabled(&self, control: Control) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_enabled(control)
    }

    /// Store an authoritative status and its reconciled controls.
    pub fn apply_status(&self, status: IngestionStatus) {
        let controls = reconcile(&status);
        self.update(|state| {
            state.status = Some(status);
            state.controls = controls;
            state.status_updates += 1;
        });
    }

    /// Replace the log tail wholesale.
    pub fn apply_logs(&self, logs: Vec<LogEntry>) {
        self.update(|state| {
            state.logs = logs;
            state.log_updates += 1;
        });
    }

    /// Set pause/resume ahead of the next status tick.
    pub fn apply_optimistic(&self, pause_enabled: bool, resume_enabled: bool) {
        self.update(|state| {
            state.controls.pause_enabled = pause_enabled;
            state.controls.resume_enabled = resume_enabled;
        });
    }

    /// Mark `control` as in flight, unless it already is.
    ///
    /// The control is released when the guard drops, on success and failure
    /// alike.
    pub fn try_acquire(&self, control: Control) -> Option<ControlGuard<'_>> {
        let acquired = self.update(|state| state.in_flight.insert(control));
        acquired.then_some(ControlGuard {
            view: self,
            control,
        })
    }

    /// Receiver that observes a new value on every view change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changed.subscribe()
    }
}

/// Keeps a control disabled while held
#[must_use]
pub struct ControlGuard<'a> {
    view: &'a ConsoleView,
    control: Control,
}

impl Drop for ControlGuard<'_> {
    fn drop(&mut self) {
        let control = self.control;
        self.view.update(|state| {
            state.in_flight.remove(&control);
        });
    }
}
