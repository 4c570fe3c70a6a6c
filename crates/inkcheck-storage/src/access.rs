//! Typed access to the persisted settings and counters.

use inkcheck_protocols::{Counters, KeyValueStore, Settings, StorageError, keys};
use serde_json::Map;
use tracing::info;

/// Read the current settings, falling back to defaults for missing keys.
pub async fn load_settings(store: &dyn KeyValueStore) -> Result<Settings, StorageError> {
    let entries = store.get(keys::SETTINGS).await?;
    Ok(Settings::from_entries(&entries))
}

/// Persist every settings key.
pub async fn save_settings(store: &dyn KeyValueStore, settings: &Settings) -> Result<(), StorageError> {
    store.set(settings.to_entries()).await
}

/// Read the stored counters exactly as persisted, without rollover.
pub async fn load_counters(store: &dyn KeyValueStore) -> Result<Counters, StorageError> {
    let entries = store.get(keys::COUNTERS).await?;
    Ok(Counters::from_entries(&entries))
}

pub async fn save_counters(store: &dyn KeyValueStore, counters: &Counters) -> Result<(), StorageError> {
    store.set(counters.to_entries()).await
}

/// Write default values for settings keys that are not stored yet.
///
/// Existing values are never overwritten. Returns the keys written.
pub async fn populate_defaults(store: &dyn KeyValueStore) -> Result<Vec<String>, StorageError> {
    let existing = store.get(keys::SETTINGS).await?;
    let missing: Map<_, _> = Settings::default()
        .to_entries()
        .into_iter()
        .filter(|(k, _)| !existing.contains_key(k))
        .collect();

    let written: Vec<String> = missing.keys().cloned().collect();
    if !missing.is_empty() {
        store.set(missing).await?;
        info!(keys = ?written, "Populated default settings");
    }
    Ok(written)
}

#[cfg(test)]
#[path = "access_tests.rs"]
mod tests;
