//! # inkcheck Host - Memory
//!
//! In-process stand-ins for the browser surfaces inkcheck drives: tabs with
//! script injection, the context menu, notifications and in-page views.

mod browser;
mod menu;
mod notify;
mod view;

pub use browser::{AgentEnvironment, PageAccess, SimulatedBrowser};
pub use menu::MenuRegistry;
pub use notify::{Notification, NotificationLog};
pub use view::{PageView, Rendered};
