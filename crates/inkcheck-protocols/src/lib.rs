//! # inkcheck Protocols
//!
//! Shared protocol definitions for the inkcheck contexts (background
//! orchestrator, per-page content agent, settings panel).
//! Contains only types, errors and interface definitions - no implementations.
//!
//! ## Core Traits
//!
//! - [`MessageHandler`] - Receives routed requests for one context endpoint
//! - [`KeyValueStore`] - Persisted settings/counters storage with change events
//! - [`PageHost`] - Page lookup and agent installation
//! - [`MenuHost`] - Context menu registration
//! - [`TextGenerator`] - External AI text generation capability
//! - [`Clock`] - Calendar date source for counter rollover

pub mod capability;
pub mod clock;
pub mod error;
pub mod host;
pub mod message;
pub mod store;
pub mod types;

pub use capability::{GenerationConfig, TextGenerator};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{
    AgentError, CapabilityError, HostError, InjectionError, OrchestratorError, RouterError,
    SettingsError, StorageError, TransportError,
};
pub use host::{MenuClick, MenuContext, MenuHost, MenuItem, Notifier, PageHost, ResultView};
pub use message::{Endpoint, MessageHandler, Request, Response};
pub use store::{KeyValueStore, Namespace, StorageChange, ValueChange, keys};
pub use types::*;
