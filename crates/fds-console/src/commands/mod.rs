//! CLI command implementations
//!
//! Each subcommand has its own module with a `run` function. Commands print
//! their own output; errors are returned to `main`, which picks how to show
//! them.

pub mod config;
pub mod control;
pub mod ingest;
pub mod logs;
pub mod query;
pub mod search;
pub mod status;
pub mod watch;

use crate::api::{ApiClient, Transport};
use crate::config::Config;
use crate::dispatcher::{AssumeYes, CommandDispatcher, Confirm, InquireConfirm};
use crate::error::Result;
use crate::view::ConsoleView;
use std::sync::Arc;

/// Everything a command needs to talk to the server
pub struct Console {
    pub config: Config,
    pub dispatcher: Arc<CommandDispatcher>,
}

impl Console {
    /// Build the HTTP client, an empty view and the dispatcher.
    ///
    /// `assume_yes` skips confirmation prompts.
    pub fn connect(config: Config, assume_yes: bool) -> Result<Self> {
        let client = ApiClient::new(config.server_url(), config.request_timeout())?;
        let confirm: Arc<dyn Confirm> = if assume_yes {
            Arc::new(AssumeYes)
        } else {
            Arc::new(InquireConfirm)
        };
        Ok(Self::with_transport(config, Arc::new(client), confirm))
    }

    pub fn with_transport(
        config: Config,
        transport: Arc<dyn Transport>,
        confirm: Arc<dyn Confirm>,
    ) -> Self {
        let dispatcher = CommandDispatcher::new(
            transport,
            Arc::new(ConsoleView::new()),
            confirm,
            config.mutation_policy,
            config.log_limit,
        );
        Self {
            config,
            dispatcher: Arc::new(dispatcher),
        }
    }

    pub fn view(&self) -> &Arc<ConsoleView> {
        self.dispatcher.view()
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        self.dispatcher.transport()
    }
}
