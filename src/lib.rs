//! # inkcheck
//!
//! AI writing assistant for selected text. Two modes: grammar and style
//! correction, and conversion of text into an image-generation prompt.
//!
//! Three contexts cooperate through a message router:
//!
//! - the **background** context owns the context menu, the usage counters
//!   and the trigger orchestration;
//! - a **page agent** is installed into a page on demand and runs the
//!   capability call for the selection;
//! - the **settings UI** edits and verifies settings and shows counters.
//!
//! [`InkcheckRuntime`] wires them together over the in-process host.

mod logging;
mod runtime;

pub use logging::init_tracing;
pub use runtime::{InkcheckRuntime, RuntimeBuilder, RuntimeError, SettingsSession};

