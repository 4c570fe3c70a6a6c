//! Persisted key-value store protocol.
//!
//! Settings and counters live in one externally owned store shared by every
//! context. No context keeps an authoritative copy; read again before acting.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::broadcast;

use crate::error::StorageError;

/// Persisted key names.
pub mod keys {
    pub const ENABLED: &str = "enabled";
    pub const API_KEY: &str = "apiKey";
    pub const MIN_LENGTH: &str = "minLength";
    pub const MODE: &str = "mode";
    pub const LEARNING_ENABLED: &str = "learningEnabled";
    pub const PROMPT_STYLE: &str = "promptStyle";
    pub const PROMPT_LENGTH: &str = "promptLength";

    pub const TODAY_CHECKS: &str = "todayChecks";
    pub const TOTAL_CHECKS: &str = "totalChecks";
    pub const TOTAL_ISSUES: &str = "totalIssues";
    pub const LAST_STATS_DATE: &str = "lastStatsDate";

    /// Keys that make up the user settings.
    pub const SETTINGS: &[&str] = &[
        ENABLED,
        API_KEY,
        MIN_LENGTH,
        MODE,
        LEARNING_ENABLED,
        PROMPT_STYLE,
        PROMPT_LENGTH,
    ];

    /// Keys that make up the usage counters.
    pub const COUNTERS: &[&str] = &[TODAY_CHECKS, TOTAL_CHECKS, TOTAL_ISSUES, LAST_STATS_DATE];

    /// Settings keys whose change requires the context menu to be rebuilt.
    pub const MENU: &[&str] = &[ENABLED, MODE];
}

/// Storage area a change happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    #[default]
    Sync,
    Local,
}

/// Old and new value of one key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueChange {
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
}

/// A batch of changed keys, emitted after every write that changed something.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageChange {
    pub namespace: Namespace,
    pub changes: BTreeMap<String, ValueChange>,
}

impl StorageChange {
    /// Whether any of `keys` changed.
    pub fn touches(&self, keys: &[&str]) -> bool {
        keys.iter().any(|k| self.changes.contains_key(*k))
    }

    pub fn changed_keys(&self) -> Vec<String> {
        self.changes.keys().cloned().collect()
    }
}

/// Key-value persistence shared by all contexts.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the given keys. Absent keys are omitted from the result.
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>, StorageError>;

    /// Write entries. Emits one [`StorageChange`] if any value changed.
    async fn set(&self, entries: Map<String, Value>) -> Result<(), StorageError>;

    /// Subscribe to change notifications.
    fn subscribe(&self) -> broadcast::Receiver<StorageChange>;
}
