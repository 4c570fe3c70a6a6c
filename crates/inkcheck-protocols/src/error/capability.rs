//! AI capability errors.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CapabilityError {
    #[error("Invalid API key")]
    InvalidKey,

    #[error("Authentication failed")]
    AuthFailed,

    #[error("Rate limited")]
    RateLimited,

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Capability unreachable: {0}")]
    Unreachable(String),

    #[error("Empty response from capability")]
    EmptyResponse,
}

impl CapabilityError {
    /// Map a non-success HTTP status.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            400 => CapabilityError::InvalidKey,
            403 => CapabilityError::AuthFailed,
            429 => CapabilityError::RateLimited,
            _ => CapabilityError::Api {
                status,
                message: message.into(),
            },
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            CapabilityError::InvalidKey => {
                "The API key is invalid. Check your settings.".to_string()
            }
            CapabilityError::AuthFailed => {
                "The API key is invalid or authentication failed.".to_string()
            }
            CapabilityError::RateLimited => {
                "API rate limit reached. Wait a moment and try again.".to_string()
            }
            CapabilityError::Api { status, message } if message.is_empty() => {
                format!("API error: {}", status)
            }
            CapabilityError::Api { status, message } => {
                format!("API error: {} {}", status, message)
            }
            CapabilityError::Unreachable(_) => {
                "Could not reach the AI service. Check your connection.".to_string()
            }
            CapabilityError::EmptyResponse => "The AI service returned no text.".to_string(),
        }
    }
}
