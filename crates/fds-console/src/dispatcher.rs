//! Command dispatcher
//!
//! Every operator action that changes backend state goes through here and
//! follows one template:
//!
//! 1. validate input locally (no request on failure)
//! 2. disable the triggering control until its request completes
//! 3. ask for confirmation when the action is destructive (no request on decline)
//! 4. issue exactly one request
//! 5. on success apply the action's transition: an optimistic control update
//!    and/or a forced refresh of status and logs
//!
//! A failed request changes nothing in the view and the control is released.
//! How a result is shown is up to the caller.
//!
//! Controls lock only themselves by default. Under
//! [`MutationPolicy::Exclusive`] all mutating commands also share one token, so
//! e.g. `pause` and `reset` cannot be in flight together.

use crate::api::{self, endpoints, Transport};
use crate::error::{ConsoleError, Result};
use crate::poller;
use crate::view::{ConsoleView, Control, ControlGuard};
use fds_common::types::{CommandReply, DiscoverRequest, IngestByNameRequest, IngestSingleRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::IsTerminal;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{info, instrument, warn};

/// Whether mutating commands exclude each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationPolicy {
    /// One mutating command at a time across all controls
    Exclusive,
    /// Only the same control is locked against itself
    #[default]
    Independent,
}

impl std::str::FromStr for MutationPolicy {
    type Err = ConsoleError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exclusive" => Ok(MutationPolicy::Exclusive),
            "independent" => Ok(MutationPolicy::Independent),
            _ => Err(ConsoleError::config(format!(
                "unknown mutation policy '{}', expected 'exclusive' or 'independent'",
                s
            ))),
        }
    }
}

/// Affirmative step in front of destructive actions
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Accepts everything (`--yes`)
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Interactive yes/no prompt, defaulting to no
pub struct InquireConfirm;

impl Confirm for InquireConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        // Without a terminal there is nobody to answer
        if !std::io::stdin().is_terminal() {
            return false;
        }
        inquire::Confirm::new(prompt)
            .with_default(false)
            .prompt()
            .unwrap_or(false)
    }
}

/// What a successful command refreshed afterwards
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Refresh {
    pub status: bool,
    pub logs: bool,
}

impl Refresh {
    const NONE: Refresh = Refresh {
        status: false,
        logs: false,
    };
    const STATUS: Refresh = Refresh {
        status: true,
        logs: false,
    };
    const ALL: Refresh = Refresh {
        status: true,
        logs: true,
    };
}

/// Transition applied after a successful request
#[derive(Debug, Clone, Copy)]
struct Transition {
    optimistic: Option<(bool, bool)>,
    refresh: Refresh,
}

/// Successful command result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub control: Control,
    pub message: String,
    /// Number of tables affected, when the backend reports it
    pub count: Option<u64>,
    pub refreshed: Refresh,
}

pub struct CommandDispatcher {
    transport: Arc<dyn Transport>,
    view: Arc<ConsoleView>,
    confirm: Arc<dyn Confirm>,
    policy: MutationPolicy,
    log_limit: u32,
    mutation: Mutex<Option<Control>>,
}

impl CommandDispatcher {
    pub fn new(
        transport: Arc<dyn Transport>,
        view: Arc<ConsoleView>,
        confirm: Arc<dyn Confirm>,
        policy: MutationPolicy,
        log_limit: u32,
    ) -> Self {
        Self {
            transport,
            view,
            confirm,
            policy,
            log_limit,
            mutation: Mutex::new(None),
        }
    }

    pub fn view(&self) -> &Arc<ConsoleView> {
        &self.view
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Ask the backend to enumerate tables from a TOC URL.
    #[instrument(skip(self))]
    pub async fn discover(&self, toc_url: &str) -> Result<CommandOutcome> {
        let toc_url = require(toc_url, "Please provide a TOC URL")?;
        let body = to_body(&DiscoverRequest {
            toc_url: toc_url.to_string(),
        })?;
        self.dispatch(
            Control::Discover,
            endpoints::DISCOVER,
            Some(body),
            Transition {
                optimistic: None,
                refresh: Refresh::ALL,
            },
            "Discovery finished",
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn start(&self) -> Result<CommandOutcome> {
        self.dispatch(
            Control::Start,
            endpoints::START,
            None,
            Transition {
                optimistic: Some((true, false)),
                refresh: Refresh::NONE,
            },
            "Ingestion started",
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn pause(&self) -> Result<CommandOutcome> {
        self.dispatch(
            Control::Pause,
            endpoints::PAUSE,
            None,
            Transition {
                optimistic: Some((false, true)),
                refresh: Refresh::NONE,
            },
            "Pause signal sent",
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn resume(&self) -> Result<CommandOutcome> {
        self.dispatch(
            Control::Resume,
            endpoints::RESUME,
            None,
            Transition {
                optimistic: Some((true, false)),
                refresh: Refresh::NONE,
            },
            "Ingestion resumed",
        )
        .await
    }

    /// Requeue failed tables.
    #[instrument(skip(self))]
    pub async fn retry_failed(&self) -> Result<CommandOutcome> {
        self.dispatch(
            Control::RetryFailed,
            endpoints::RETRY_FAILED,
            None,
            Transition {
                optimistic: None,
                refresh: Refresh::STATUS,
            },
            "Failed tables requeued",
        )
        .await
    }

    /// Wipe all ingestion state. Requires confirmation.
    #[instrument(skip(self))]
    pub async fn reset(&self) -> Result<CommandOutcome> {
        let control_guard = self.acquire_control(Control::Reset)?;
        self.confirm_or_decline(
            Control::Reset,
            "Reset ALL ingestion data? Discovered and ingested tables will be deleted.",
        )?;
        self.dispatch_held(
            control_guard,
            Control::Reset,
            endpoints::RESET,
            None,
            Transition {
                optimistic: None,
                refresh: Refresh::ALL,
            },
            "All data cleared",
        )
        .await
    }

    /// Ingest one table by URL and name. Requires confirmation.
    #[instrument(skip(self))]
    pub async fn ingest_single(&self, table_url: &str, table_name: &str) -> Result<CommandOutcome> {
        let table_name = require(table_name, "Please provide a table name")?;
        let table_url = require(table_url, "Please provide a table URL")?;
        let control_guard = self.acquire_control(Control::IngestSingle)?;
        self.confirm_or_decline(
            Control::IngestSingle,
            &format!("Ingest table {}?", table_name),
        )?;

        let body = to_body(&IngestSingleRequest {
            table_url: table_url.to_string(),
            table_name: table_name.to_string(),
        })?;
        self.dispatch_held(
            control_guard,
            Control::IngestSingle,
            endpoints::INGEST_SINGLE,
            Some(body),
            Transition {
                optimistic: None,
                refresh: Refresh::ALL,
            },
            "Table ingested",
        )
        .await
    }

    /// Resolve a table by name among discovered tables and ingest it.
    #[instrument(skip(self))]
    pub async fn ingest_by_name(&self, table_name: &str) -> Result<CommandOutcome> {
        let table_name = require(table_name, "Please provide a table name")?;
        let body = to_body(&IngestByNameRequest {
            table_name: table_name.to_string(),
        })?;
        self.dispatch(
            Control::IngestByName,
            endpoints::INGEST_BY_NAME,
            Some(body),
            Transition {
                optimistic: None,
                refresh: Refresh::ALL,
            },
            "Table ingested",
        )
        .await
    }

    fn confirm_or_decline(&self, control: Control, prompt: &str) -> Result<()> {
        if self.confirm.confirm(prompt) {
            Ok(())
        } else {
            info!(%control, "Confirmation declined");
            Err(ConsoleError::Declined(control))
        }
    }

    fn acquire_mutation(&self, control: Control) -> Result<Option<MutationGuard<'_>>> {
        if self.policy == MutationPolicy::Independent || !control.is_mutating() {
            return Ok(None);
        }
        let mut holder = self.mutation.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(current) = *holder {
            return Err(ConsoleError::Busy(current));
        }
        *holder = Some(control);
        Ok(Some(MutationGuard {
            slot: &self.mutation,
        }))
    }

    fn acquire_control(&self, control: Control) -> Result<ControlGuard<'_>> {
        self.view
            .try_acquire(control)
            .ok_or(ConsoleError::Busy(control))
    }

    async fn dispatch(
        &self,
        control: Control,
        endpoint: &str,
        body: Option<Value>,
        transition: Transition,
        fallback_message: &str,
    ) -> Result<CommandOutcome> {
        let control_guard = self.acquire_control(control)?;
        self.dispatch_held(
            control_guard,
            control,
            endpoint,
            body,
            transition,
            fallback_message,
        )
        .await
    }

    /// Send with `control` already held, e.g. across a confirmation prompt.
    async fn dispatch_held(
        &self,
        control_guard: ControlGuard<'_>,
        control: Control,
        endpoint: &str,
        body: Option<Value>,
        transition: Transition,
        fallback_message: &str,
    ) -> Result<CommandOutcome> {
        let mutation_guard = self.acquire_mutation(control)?;

        let reply = api::post_command(self.transport.as_ref(), endpoint, body).await;

        drop(mutation_guard);
        drop(control_guard);

        let reply: CommandReply = match reply {
            Ok(reply) => reply,
            Err(e) => {
                warn!(%control, error = %e, "Command failed");
                return Err(e);
            }
        };

        if let Some((pause_enabled, resume_enabled)) = transition.optimistic {
            self.view.apply_optimistic(pause_enabled, resume_enabled);
        }

        let mut refreshed = Refresh::default();
        if transition.refresh.status {
            refreshed.status = self.refresh_status().await;
        }
        if transition.refresh.logs {
            refreshed.logs = self.refresh_logs().await;
        }

        let message = reply
            .message
            .unwrap_or_else(|| fallback_message.to_string());
        info!(%control, message = %message, "Command succeeded");

        Ok(CommandOutcome {
            control,
            message,
            count: reply.count,
            refreshed,
        })
    }

    /// Forced status refresh; failures behave like a failed poll tick.
    pub async fn refresh_status(&self) -> bool {
        match poller::refresh_status(self.transport.as_ref(), &self.view).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Forced status refresh failed");
                false
            }
        }
    }

    /// Forced log refresh; failures behave like a failed poll tick.
    pub async fn refresh_logs(&self) -> bool {
        match poller::refresh_logs(self.transport.as_ref(), &self.view, self.log_limit).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Forced log refresh failed");
                false
            }
        }
    }
}

/// Holds the shared mutation token
struct MutationGuard<'a> {
    slot: &'a Mutex<Option<Control>>,
}

impl Drop for MutationGuard<'_> {
    fn drop(&mut self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

fn require<'a>(input: &'a str, message: &str) -> Result<&'a str> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ConsoleError::validation(message));
    }
    Ok(trimmed)
}

fn to_body<T: Serialize>(request: &T) -> Result<Value> {
    serde_json::to_value(request).map_err(|e| ConsoleError::Other(e.into()))
}
