//! JSON file backed store.
//!
//! The whole store is one JSON object:
//! ```text
//! {
//!   "enabled": true,
//!   "apiKey": "...",
//!   "todayChecks": 3,
//!   ...
//! }
//! ```
//! Writes go to a sibling temporary file that is then renamed over the
//! original.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use inkcheck_protocols::{KeyValueStore, Namespace, StorageChange, StorageError};
use serde_json::{Map, Value};
use tokio::fs;
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, warn};

use crate::CHANGE_CHANNEL_CAPACITY;
use crate::change;

/// Store persisted to a single JSON file.
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<Map<String, Value>>,
    changes: broadcast::Sender<StorageChange>,
}

impl FileStore {
    /// Open the store at `path`, creating parent directories as needed.
    ///
    /// A missing file is an empty store. A file that is not a JSON object is
    /// an error.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let entries = Self::read(&path).await?;
        debug!("FileStore opened at {:?} with {} keys", path, entries.len());

        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Ok(Self {
            path,
            entries: RwLock::new(entries),
            changes,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(path: &Path) -> Result<Map<String, Value>, StorageError> {
        if !path.exists() {
            return Ok(Map::new());
        }

        let content = fs::read_to_string(path).await?;
        if content.trim().is_empty() {
            warn!("Store file {:?} is empty, starting fresh", path);
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&content)? {
            Value::Object(map) => Ok(map),
            other => Err(StorageError::Serialization(format!(
                "expected a JSON object in {:?}, found {}",
                path,
                type_name(&other)
            ))),
        }
    }

    async fn write(&self, entries: &Map<String, Value>) -> Result<(), StorageError> {
        let content = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>, StorageError> {
        let entries = self.entries.read().await;
        Ok(change::select(&entries, keys))
    }

    async fn set(&self, entries: Map<String, Value>) -> Result<(), StorageError> {
        let mut current = self.entries.write().await;
        let mut next = current.clone();
        let Some(change) = change::apply(&mut next, entries, Namespace::Sync) else {
            return Ok(());
        };

        self.write(&next).await?;
        *current = next;

        debug!(keys = ?change.changed_keys(), "Saved store to {:?}", self.path);
        let _ = self.changes.send(change);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.changes.subscribe()
    }
}
