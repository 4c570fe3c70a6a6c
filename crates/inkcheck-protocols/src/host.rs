//! Host environment interfaces: pages, menus, notifications and result views.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::HostError;
use crate::types::{AgentHandle, ContextId, CorrectionResult, Intent, TransformResult};

/// Page lookup and agent installation.
#[async_trait]
pub trait PageHost: Send + Sync {
    /// Fresh lookup of one page.
    async fn page(&self, id: ContextId) -> Result<AgentHandle, HostError>;

    /// All open pages.
    async fn pages(&self) -> Vec<AgentHandle>;

    /// The focused page of the focused window, if any.
    async fn active_page(&self) -> Option<AgentHandle>;

    /// Install the agent script resource into a page.
    async fn install_script(&self, id: ContextId, resource: &str) -> Result<(), HostError>;

    /// Install a stylesheet resource into a page.
    async fn install_style(&self, id: ContextId, resource: &str) -> Result<(), HostError>;
}

/// Context a menu entry shows up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuContext {
    Selection,
}

/// A context menu entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: String,
    pub title: String,
    pub contexts: Vec<MenuContext>,
    pub document_url_patterns: Vec<String>,
}

/// A click on one of our menu entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuClick {
    pub menu_item_id: String,
    pub selection_text: Option<String>,
    pub page: ContextId,
}

/// Context menu registration.
#[async_trait]
pub trait MenuHost: Send + Sync {
    async fn remove_all(&self) -> Result<(), HostError>;
    async fn create(&self, item: MenuItem) -> Result<(), HostError>;
}

/// Transient, dismissable user notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, message: &str);
}

/// In-page rendering of progress and results.
pub trait ResultView: Send + Sync {
    fn show_progress(&self, intent: Intent);
    fn show_correction(&self, original: &str, result: &CorrectionResult);
    fn show_prompt(&self, result: &TransformResult);
    fn show_error(&self, message: &str);
}
