//! Status poller
//!
//! Two independent repeating ticks keep the view close to server truth:
//!
//! - status, every `status_interval` (3s by default): fetch the aggregate
//!   status and reconcile it into the view
//! - logs, every `logs_interval` (5s by default): fetch the newest
//!   `log_limit` lines and replace the displayed tail
//!
//! Both fire once immediately on [`Poller::start`]. Tick failures are logged
//! and otherwise ignored; the next tick tries again.

use crate::api::{self, Transport};
use crate::config::Config;
use crate::error::Result;
use crate::view::ConsoleView;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Tick periods and log tail size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub status_interval: Duration,
    pub logs_interval: Duration,
    pub log_limit: u32,
}

impl From<&Config> for PollSettings {
    fn from(config: &Config) -> Self {
        Self {
            status_interval: config.status_interval(),
            logs_interval: config.logs_interval(),
            log_limit: config.log_limit,
        }
    }
}

/// Fetch the status once and reconcile it into the view.
pub async fn refresh_status(transport: &dyn Transport, view: &ConsoleView) -> Result<()> {
    let status = api::fetch_status(transport).await?;
    debug!(
        is_running = status.is_running,
        is_paused = status.is_paused,
        pending = status.summary.pending,
        "Status refreshed"
    );
    view.apply_status(status);
    Ok(())
}

/// Fetch the log tail once and replace the displayed list.
pub async fn refresh_logs(transport: &dyn Transport, view: &ConsoleView, limit: u32) -> Result<()> {
    let logs = api::fetch_logs(transport, limit).await?;
    debug!(count = logs.len(), "Logs refreshed");
    view.apply_logs(logs);
    Ok(())
}

/// Owner of the two polling tasks.
///
/// Dropping the poller stops it.
pub struct Poller {
    transport: Arc<dyn Transport>,
    view: Arc<ConsoleView>,
    settings: PollSettings,
    tasks: Vec<JoinHandle<()>>,
}

impl Poller {
    pub fn new(transport: Arc<dyn Transport>, view: Arc<ConsoleView>, settings: PollSettings) -> Self {
        Self {
            transport,
            view,
            settings,
            tasks: Vec::new(),
        }
    }

    pub fn settings(&self) -> PollSettings {
        self.settings
    }

    pub fn is_running(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Spawn both ticks. Must be called inside a Tokio runtime; a second call
    /// while running does nothing.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }

        let (transport, view) = (self.transport.clone(), self.view.clone());
        let status = spawn_ticker("status", self.settings.status_interval, move || {
            let (transport, view) = (transport.clone(), view.clone());
            async move { refresh_status(transport.as_ref(), &view).await }
        });

        let (transport, view) = (self.transport.clone(), self.view.clone());
        let limit = self.settings.log_limit;
        let logs = spawn_ticker("logs", self.settings.logs_interval, move || {
            let (transport, view) = (transport.clone(), view.clone());
            async move { refresh_logs(transport.as_ref(), &view, limit).await }
        });

        self.tasks = vec![status, logs];
        debug!(
            status_ms = self.settings.status_interval.as_millis() as u64,
            logs_ms = self.settings.logs_interval.as_millis() as u64,
            "Poller started"
        );
    }

    /// Cancel both ticks. Safe to call when not running.
    pub fn stop(&mut self) {
        if self.tasks.is_empty() {
            return;
        }
        for task in self.tasks.drain(..) {
            task.abort();
        }
        debug!("Poller stopped");
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}

fn spawn_ticker<F, Fut>(name: &'static str, period: Duration, mut tick: F) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if let Err(e) = tick().await {
                warn!(tick = name, error = %e, "Poll failed");
            }
        }
    })
}
