//! Error types for the inkcheck protocol layer.

mod agent;
mod capability;
mod host;
mod injection;
mod orchestrator;
mod router;
mod settings;
mod storage;
mod transport;

pub use agent::*;
pub use capability::*;
pub use host::*;
pub use injection::*;
pub use orchestrator::*;
pub use router::*;
pub use settings::*;
pub use storage::*;
pub use transport::*;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
