//! Host environment errors.

use thiserror::Error;

use crate::types::ContextId;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("Page closed: {0}")]
    PageClosed(ContextId),

    #[error("Restricted page: {0}")]
    Restricted(String),

    #[error("Host operation failed: {0}")]
    Failed(String),
}
