//! Error types for the ingestion console
//!
//! Two failure families come back from the backend: transport failures (the
//! exchange itself broke) and application failures (`success: false` with an
//! `error` message). The rest are raised client-side before any request is
//! sent. How an error is shown is decided by the caller through
//! [`ConsoleError::presentation`], never by the code that produced it.

use crate::view::Control;
use thiserror::Error;

/// Result type alias for console operations
pub type Result<T> = std::result::Result<T, ConsoleError>;

/// Network failure, timeout, or a response body that is not JSON.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            format!("request timed out: {}", err)
        } else if err.is_decode() {
            format!("response is not valid JSON: {}", err)
        } else {
            err.to_string()
        };
        Self { message }
    }
}

#[derive(Error, Debug)]
pub enum ConsoleError {
    /// The request never produced a usable response
    #[error("Network request failed: {0}. Check that the ingestion server is running and the server URL is correct.")]
    Transport(#[from] TransportError),

    /// The backend answered with `success: false`
    #[error("{0}")]
    Application(String),

    /// Input rejected before any request was sent
    #[error("{0}")]
    Validation(String),

    /// The control (or the shared mutation token) is held by a request in flight
    #[error("'{0}' is already in progress. Wait for it to finish.")]
    Busy(Control),

    /// The operator declined the confirmation step; nothing was sent
    #[error("'{0}' cancelled.")]
    Declined(Control),

    /// Configuration is missing or invalid
    #[error("Configuration error: {0}. Check your environment variables or config file.")]
    Config(String),

    /// Reading or writing a local file failed
    #[error("File operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ConsoleError {
    pub fn application(msg: impl Into<String>) -> Self {
        Self::Application(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// How this error should be shown for an action of the given class.
    pub fn presentation(&self, class: ActionClass) -> Presentation {
        match (class, self) {
            (ActionClass::Polling, _) => Presentation::Silent,
            (_, Self::Transport(_)) => Presentation::Blocking,
            (_, Self::Declined(_)) => Presentation::Inline,
            (ActionClass::Search | ActionClass::Query, Self::Application(_))
            | (ActionClass::Search | ActionClass::Query, Self::Validation(_))
            | (ActionClass::Search | ActionClass::Query, Self::Busy(_)) => Presentation::Inline,
            _ => Presentation::Blocking,
        }
    }
}

/// The kind of activity an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionClass {
    /// Background status and log ticks
    Polling,
    /// Operator-triggered state changes
    Command,
    /// Table search
    Search,
    /// Ad-hoc query
    Query,
}

/// Where an error surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    /// Only the diagnostic log
    Silent,
    /// A panel scoped to the result area
    Inline,
    /// A notice the operator has to acknowledge
    Blocking,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polling_errors_are_silent() {
        let err = ConsoleError::Transport(TransportError::new("connection refused"));
        assert_eq!(err.presentation(ActionClass::Polling), Presentation::Silent);
    }

    #[test]
    fn test_transport_errors_block_user_actions() {
        let err = ConsoleError::Transport(TransportError::new("connection refused"));
        assert_eq!(err.presentation(ActionClass::Command), Presentation::Blocking);
        assert_eq!(err.presentation(ActionClass::Search), Presentation::Blocking);
        assert_eq!(err.presentation(ActionClass::Query), Presentation::Blocking);
    }

    #[test]
    fn test_application_errors_by_class() {
        let err = ConsoleError::application("No pending tables. Run discovery first.");
        assert_eq!(err.presentation(ActionClass::Command), Presentation::Blocking);
        assert_eq!(err.presentation(ActionClass::Search), Presentation::Inline);
        assert_eq!(err.presentation(ActionClass::Query), Presentation::Inline);
    }

    #[test]
    fn test_declined_is_inline() {
        let err = ConsoleError::Declined(Control::Reset);
        assert_eq!(err.presentation(ActionClass::Command), Presentation::Inline);
        assert_eq!(err.to_string(), "'reset' cancelled.");
    }
}
