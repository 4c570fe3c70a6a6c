//! User settings persisted in the shared store.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Intent;
use crate::store::keys;

/// Minimum selection length for correction mode when nothing is stored.
pub const DEFAULT_MIN_SELECTION_LENGTH: u32 = 10;

/// Which action the context menu offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    #[serde(rename = "text-check")]
    CheckText,
    #[serde(rename = "prompt-convert")]
    ConvertPrompt,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::CheckText => "text-check",
            Mode::ConvertPrompt => "prompt-convert",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "text-check" => Some(Mode::CheckText),
            "prompt-convert" => Some(Mode::ConvertPrompt),
            _ => None,
        }
    }

    pub fn intent(&self) -> Intent {
        match self {
            Mode::CheckText => Intent::CheckText,
            Mode::ConvertPrompt => Intent::ConvertPrompt,
        }
    }
}

/// Visual style requested for converted prompts.
///
/// `None` means a plain translation with no creative variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptStyle {
    None,
    #[default]
    Detailed,
    Artistic,
    Anime,
    Photography,
    Minimalist,
}

impl PromptStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptStyle::None => "none",
            PromptStyle::Detailed => "detailed",
            PromptStyle::Artistic => "artistic",
            PromptStyle::Anime => "anime",
            PromptStyle::Photography => "photography",
            PromptStyle::Minimalist => "minimalist",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "none" => Some(PromptStyle::None),
            "detailed" => Some(PromptStyle::Detailed),
            "artistic" => Some(PromptStyle::Artistic),
            "anime" => Some(PromptStyle::Anime),
            "photography" => Some(PromptStyle::Photography),
            "minimalist" => Some(PromptStyle::Minimalist),
            _ => None,
        }
    }

    pub fn is_simple_translation(&self) -> bool {
        matches!(self, PromptStyle::None)
    }
}

/// Target length of converted prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl PromptLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptLength::Short => "short",
            PromptLength::Medium => "medium",
            PromptLength::Long => "long",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "short" => Some(PromptLength::Short),
            "medium" => Some(PromptLength::Medium),
            "long" => Some(PromptLength::Long),
            _ => None,
        }
    }
}

/// User settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub enabled: bool,
    pub api_key: String,
    pub min_selection_length: u32,
    pub mode: Mode,
    pub learning_enabled: bool,
    pub prompt_style: PromptStyle,
    pub prompt_length: PromptLength,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: String::new(),
            min_selection_length: DEFAULT_MIN_SELECTION_LENGTH,
            mode: Mode::default(),
            learning_enabled: true,
            prompt_style: PromptStyle::default(),
            prompt_length: PromptLength::default(),
        }
    }
}

impl Settings {
    /// Build settings from raw store entries.
    ///
    /// Missing or unreadable values fall back to defaults; booleans are only
    /// false when explicitly stored as `false`.
    pub fn from_entries(entries: &Map<String, Value>) -> Self {
        let defaults = Settings::default();
        let str_of = |key: &str| entries.get(key).and_then(Value::as_str);

        Self {
            enabled: entries.get(keys::ENABLED).and_then(Value::as_bool) != Some(false),
            api_key: str_of(keys::API_KEY).unwrap_or_default().to_string(),
            min_selection_length: entries
                .get(keys::MIN_LENGTH)
                .and_then(Value::as_u64)
                .filter(|v| *v > 0)
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(defaults.min_selection_length),
            mode: str_of(keys::MODE).and_then(Mode::parse).unwrap_or(defaults.mode),
            learning_enabled: entries.get(keys::LEARNING_ENABLED).and_then(Value::as_bool)
                != Some(false),
            prompt_style: str_of(keys::PROMPT_STYLE)
                .and_then(PromptStyle::parse)
                .unwrap_or(defaults.prompt_style),
            prompt_length: str_of(keys::PROMPT_LENGTH)
                .and_then(PromptLength::parse)
                .unwrap_or(defaults.prompt_length),
        }
    }

    /// Serialize into store entries keyed by the persisted key names.
    pub fn to_entries(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(keys::ENABLED.into(), Value::Bool(self.enabled));
        map.insert(keys::API_KEY.into(), Value::String(self.api_key.clone()));
        map.insert(keys::MIN_LENGTH.into(), Value::from(self.min_selection_length));
        map.insert(keys::MODE.into(), Value::String(self.mode.as_str().into()));
        map.insert(keys::LEARNING_ENABLED.into(), Value::Bool(self.learning_enabled));
        map.insert(
            keys::PROMPT_STYLE.into(),
            Value::String(self.prompt_style.as_str().into()),
        );
        map.insert(
            keys::PROMPT_LENGTH.into(),
            Value::String(self.prompt_length.as_str().into()),
        );
        map
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}
