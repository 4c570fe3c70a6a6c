//! Content agent errors.

use thiserror::Error;

use super::CapabilityError;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AgentError {
    #[error("API key not configured")]
    MissingApiKey,

    #[error("Selection too short: {actual} characters, {required} required")]
    SelectionTooShort { actual: usize, required: usize },

    #[error("Capability error: {0}")]
    Capability(#[from] CapabilityError),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl AgentError {
    pub fn user_message(&self) -> String {
        match self {
            AgentError::MissingApiKey => {
                "No API key is configured. Set one in the extension settings.".to_string()
            }
            AgentError::SelectionTooShort { actual, required } => format!(
                "The selection is too short ({} characters). Select at least {} characters.",
                actual, required
            ),
            AgentError::Capability(e) => e.user_message(),
            AgentError::Storage(_) => "Could not read the extension settings.".to_string(),
        }
    }
}
