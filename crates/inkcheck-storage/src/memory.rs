//! In-memory store.

use async_trait::async_trait;
use inkcheck_protocols::{KeyValueStore, Namespace, StorageChange, StorageError};
use serde_json::{Map, Value};
use tokio::sync::{RwLock, broadcast};
use tracing::trace;

use crate::CHANGE_CHANNEL_CAPACITY;
use crate::change;

/// Volatile store, lost when dropped.
pub struct MemoryStore {
    entries: RwLock<Map<String, Value>>,
    changes: broadcast::Sender<StorageChange>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::with_entries(Map::new())
    }

    /// Create a store pre-populated with `entries`. No change is emitted.
    pub fn with_entries(entries: Map<String, Value>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            entries: RwLock::new(entries),
            changes,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>, StorageError> {
        let entries = self.entries.read().await;
        Ok(change::select(&entries, keys))
    }

    async fn set(&self, entries: Map<String, Value>) -> Result<(), StorageError> {
        let mut current = self.entries.write().await;
        if let Some(change) = change::apply(&mut current, entries, Namespace::Sync) {
            trace!(keys = ?change.changed_keys(), "memory store changed");
            // No subscribers is fine.
            let _ = self.changes.send(change);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.changes.subscribe()
    }
}
