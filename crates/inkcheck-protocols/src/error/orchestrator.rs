//! Orchestrator errors.

use thiserror::Error;

use super::{AgentError, InjectionError, RouterError, TransportError};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrchestratorError {
    #[error("Selection too short: {actual} characters, {required} required")]
    SelectionTooShort { actual: usize, required: usize },

    #[error("Injection failed: {0}")]
    Injection(#[from] InjectionError),

    #[error("Delivery failed: {0}")]
    Delivery(#[from] TransportError),

    #[error("Agent failed: {0}")]
    Agent(#[from] AgentError),

    #[error("Unexpected reply: {0}")]
    Protocol(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<RouterError> for OrchestratorError {
    fn from(e: RouterError) -> Self {
        match e {
            RouterError::Transport(t) => OrchestratorError::Delivery(t),
            RouterError::Agent(a) => OrchestratorError::Agent(a),
            RouterError::Storage(s) => OrchestratorError::Storage(s),
            other => OrchestratorError::Protocol(other.to_string()),
        }
    }
}

impl OrchestratorError {
    /// Notification title for this failure.
    pub fn title(&self) -> &'static str {
        match self {
            OrchestratorError::SelectionTooShort { .. } => "Selection error",
            _ => "Error",
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            OrchestratorError::SelectionTooShort { actual: 0, required } => format!(
                "Select at least {} characters of text, then right-click.",
                required
            ),
            OrchestratorError::SelectionTooShort { actual, required } => format!(
                "The selection is too short ({} characters). Select at least {} characters.",
                actual, required
            ),
            OrchestratorError::Injection(e) => e.user_message(),
            OrchestratorError::Delivery(e) => e.user_message(),
            OrchestratorError::Agent(e) => e.user_message(),
            OrchestratorError::Protocol(_) | OrchestratorError::Storage(_) => {
                "Processing failed.".to_string()
            }
        }
    }
}
