//! # inkcheck Core
//!
//! Coordination between the three inkcheck contexts:
//!
//! - **Background**: [`BackgroundService`] owns the context menu, the
//!   [`Orchestrator`] and the [`CountersStore`].
//! - **Page agent**: [`ContentAgent`], installed lazily into a page by the
//!   [`AgentInjector`].
//! - **Settings UI**: [`SettingsPanel`], alive only while open.
//!
//! All three talk through the [`MessageRouter`].

pub mod agent;
pub mod background;
pub mod counters;
pub mod error;
pub mod extract;
pub mod injector;
pub mod menu;
pub mod orchestrator;
pub mod prompt;
pub mod router;
pub mod settings_panel;

#[cfg(test)]
pub(crate) mod testing;

pub use agent::{ContentAgent, PageContext};
pub use background::{BackgroundService, InstallReason};
pub use counters::CountersStore;
pub use error::LifecycleError;
pub use extract::{extract_correction, extract_transform};
pub use injector::{AgentInjector, is_supported_url};
pub use menu::{MenuManager, MenuState};
pub use orchestrator::Orchestrator;
pub use router::{MessageRouter, Registration};
pub use settings_panel::SettingsPanel;
