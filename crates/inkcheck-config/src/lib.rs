//! # inkcheck Config
//!
//! Configuration management for the inkcheck contexts: liveness policies,
//! router timeouts, capability parameters, storage and logging.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
