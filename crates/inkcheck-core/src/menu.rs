//! Context menu registration.
//!
//! ```text
//! NoMenu ──rebuild(enabled)──▶ MenuForMode(mode)
//!   ▲                               │
//!   └──────rebuild(disabled)────────┘
//! ```
//!
//! Every rebuild removes all entries before creating the one for the
//! current mode, so at most one entry exists at any time.

use std::fmt;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use inkcheck_protocols::{HostError, Intent, MenuContext, MenuHost, MenuItem, Mode, Settings};

pub const CHECK_TEXT_MENU_ID: &str = "aiTextChecker";
pub const CONVERT_PROMPT_MENU_ID: &str = "midjourneyPrompt";

const DOCUMENT_URL_PATTERNS: &[&str] = &["http://*/*", "https://*/*"];

/// Registered menu state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuState {
    #[default]
    NoMenu,
    MenuForMode(Mode),
}

impl fmt::Display for MenuState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuState::NoMenu => write!(f, "no-menu"),
            MenuState::MenuForMode(mode) => write!(f, "menu({})", mode.as_str()),
        }
    }
}

/// Entry shown for a mode.
pub fn menu_item_for(mode: Mode) -> MenuItem {
    let (id, title) = match mode {
        Mode::CheckText => (CHECK_TEXT_MENU_ID, "Check text with AI"),
        Mode::ConvertPrompt => (CONVERT_PROMPT_MENU_ID, "Convert to image prompt"),
    };
    MenuItem {
        id: id.to_string(),
        title: title.to_string(),
        contexts: vec![MenuContext::Selection],
        document_url_patterns: DOCUMENT_URL_PATTERNS.iter().map(|p| p.to_string()).collect(),
    }
}

/// Intent selected by a menu entry id; `None` for ids we do not own.
pub fn intent_for_menu_id(id: &str) -> Option<Intent> {
    match id {
        CHECK_TEXT_MENU_ID => Some(Intent::CheckText),
        CONVERT_PROMPT_MENU_ID => Some(Intent::ConvertPrompt),
        _ => None,
    }
}

/// Keeps the host's context menu in line with the settings.
pub struct MenuManager {
    host: Arc<dyn MenuHost>,
    state: Mutex<MenuState>,
}

impl MenuManager {
    pub fn new(host: Arc<dyn MenuHost>) -> Self {
        Self {
            host,
            state: Mutex::new(MenuState::NoMenu),
        }
    }

    pub async fn state(&self) -> MenuState {
        *self.state.lock().await
    }

    /// Remove every entry, then create the entry for the current mode if
    /// enabled. Concurrent rebuilds run one after another.
    pub async fn rebuild(&self, settings: &Settings) -> Result<MenuState, HostError> {
        let mut state = self.state.lock().await;

        self.host.remove_all().await?;
        *state = MenuState::NoMenu;

        if !settings.enabled {
            debug!("Menu disabled");
            return Ok(*state);
        }

        self.host.create(menu_item_for(settings.mode)).await?;
        *state = MenuState::MenuForMode(settings.mode);
        info!(state = %*state, "Menu rebuilt");
        Ok(*state)
    }
}
