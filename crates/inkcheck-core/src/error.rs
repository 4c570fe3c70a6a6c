//! Background lifecycle errors.

use inkcheck_protocols::{HostError, StorageError};
use thiserror::Error;

/// Failure of an install, startup or storage-change reaction.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Menu registration failed: {0}")]
    Menu(#[from] HostError),
}
