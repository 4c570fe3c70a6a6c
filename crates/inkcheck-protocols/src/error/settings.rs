//! Settings panel errors.

use thiserror::Error;

use super::StorageError;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Invalid value for {field}: {message}")]
    Validation { field: String, message: String },

    #[error("API key was rejected")]
    ApiKeyRejected,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl SettingsError {
    pub fn user_message(&self) -> String {
        match self {
            SettingsError::Validation { message, .. } => message.clone(),
            SettingsError::ApiKeyRejected => "The API key is invalid. Check it.".to_string(),
            SettingsError::Storage(_) => "Failed to save settings.".to_string(),
        }
    }
}
