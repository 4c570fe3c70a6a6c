//! Message routing errors.

use thiserror::Error;

use super::{AgentError, TransportError};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RouterError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Malformed payload for {action}: {message}")]
    MalformedPayload { action: String, message: String },

    #[error("{endpoint} does not handle {action}")]
    Unsupported { endpoint: String, action: String },

    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

impl From<super::StorageError> for RouterError {
    fn from(e: super::StorageError) -> Self {
        RouterError::Storage(e.to_string())
    }
}
