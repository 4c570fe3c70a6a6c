//! Agent injection errors.

use thiserror::Error;

use crate::types::ContextId;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InjectionError {
    #[error("Unsupported page: {url}")]
    UnsupportedPage { url: String },

    #[error("Agent installation failed: {0}")]
    InstallFailed(String),

    #[error("Page closed: {0}")]
    PageClosed(ContextId),

    #[error("Page did not finish loading within {waited_ms} ms")]
    Timeout { waited_ms: u64 },
}

impl InjectionError {
    pub fn user_message(&self) -> String {
        match self {
            InjectionError::UnsupportedPage { .. } => {
                "This page cannot be used. Try again on a regular web page.".to_string()
            }
            InjectionError::InstallFailed(reason) => {
                format!("Could not start on this page: {}", reason)
            }
            InjectionError::PageClosed(_) => "The tab was closed.".to_string(),
            InjectionError::Timeout { .. } => {
                "The page took too long to load. Try again once it has finished loading."
                    .to_string()
            }
        }
    }
}
