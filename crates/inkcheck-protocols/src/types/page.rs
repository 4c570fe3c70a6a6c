//! Page, intent and command types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of one page execution context (a browser tab).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextId(pub u64);

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tab:{}", self.0)
    }
}

/// Page load state as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    Loading,
    Complete,
}

/// Kind of window hosting a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowKind {
    #[default]
    Normal,
    Popup,
    Frame,
}

impl WindowKind {
    /// Detached and framed windows initialise more slowly than normal tabs.
    pub fn is_detached(&self) -> bool {
        matches!(self, WindowKind::Popup | WindowKind::Frame)
    }
}

impl fmt::Display for WindowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowKind::Normal => write!(f, "normal"),
            WindowKind::Popup => write!(f, "popup"),
            WindowKind::Frame => write!(f, "frame"),
        }
    }
}

/// Snapshot of a page context, looked up fresh from the host each time.
///
/// Never cache one of these across a suspension point: the page can be
/// navigated or destroyed without notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentHandle {
    pub context_id: ContextId,
    pub url: String,
    pub load_state: LoadState,
    pub window_kind: WindowKind,
}

impl AgentHandle {
    pub fn new(context_id: ContextId, url: impl Into<String>) -> Self {
        Self {
            context_id,
            url: url.into(),
            load_state: LoadState::Complete,
            window_kind: WindowKind::Normal,
        }
    }

    pub fn with_load_state(mut self, load_state: LoadState) -> Self {
        self.load_state = load_state;
        self
    }

    pub fn with_window_kind(mut self, window_kind: WindowKind) -> Self {
        self.window_kind = window_kind;
        self
    }

    pub fn is_complete(&self) -> bool {
        self.load_state == LoadState::Complete
    }
}

/// What a command asks the agent to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    CheckText,
    ConvertPrompt,
    Ping,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::CheckText => write!(f, "check_text"),
            Intent::ConvertPrompt => write!(f, "convert_prompt"),
            Intent::Ping => write!(f, "ping"),
        }
    }
}

/// A command addressed to one page's agent. Consumed once, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub intent: Intent,
    pub selected_text: Option<String>,
    pub target: ContextId,
}

impl Command {
    pub fn new(intent: Intent, target: ContextId) -> Self {
        Self {
            intent,
            selected_text: None,
            target,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.selected_text = Some(text.into());
        self
    }
}
