//! Cross-context delivery errors.

use thiserror::Error;

/// Why a message could not be delivered or answered.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    #[error("Extension context invalidated")]
    ExtensionInvalidated,

    #[error("Restricted page")]
    RestrictedPage,

    #[error("Page is read-only")]
    ReadOnlyPage,

    #[error("No reply within {0} ms")]
    Timeout(u64),

    #[error("Delivery failed: {0}")]
    Other(String),
}

impl TransportError {
    /// Classify a plain failure message from a host that has no error codes.
    ///
    /// Only host adapters should need this; the in-process router reports
    /// typed errors directly.
    pub fn from_host_message(message: &str) -> Self {
        if message.contains("Could not establish connection")
            || message.contains("Receiving end does not exist")
        {
            TransportError::ConnectionLost(message.to_string())
        } else if message.contains("Extension context invalidated") {
            TransportError::ExtensionInvalidated
        } else if message.contains("Cannot access a chrome")
            || message.contains("Cannot access contents of")
        {
            TransportError::RestrictedPage
        } else if message.contains("Tabs cannot be edited") {
            TransportError::ReadOnlyPage
        } else {
            TransportError::Other(message.to_string())
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            TransportError::ConnectionLost(_) => {
                "Not available on this page. Try again on a regular web page.".to_string()
            }
            TransportError::ExtensionInvalidated => "Please reload the extension.".to_string(),
            TransportError::RestrictedPage => {
                "Browser-internal pages are not supported. Try a regular web page.".to_string()
            }
            TransportError::ReadOnlyPage => "This page cannot be edited.".to_string(),
            TransportError::Timeout(_) | TransportError::Other(_) => {
                "Processing failed.".to_string()
            }
        }
    }
}
