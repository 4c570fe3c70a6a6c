//! Change detection shared by the store implementations.

use std::collections::BTreeMap;

use inkcheck_protocols::{Namespace, StorageChange, ValueChange};
use serde_json::{Map, Value};

/// Apply `entries` to `current` and describe what actually changed.
///
/// Writing a value equal to the stored one is not a change.
pub(crate) fn apply(
    current: &mut Map<String, Value>,
    entries: Map<String, Value>,
    namespace: Namespace,
) -> Option<StorageChange> {
    let mut changes = BTreeMap::new();

    for (key, new_value) in entries {
        let old_value = current.get(&key).cloned();
        if old_value.as_ref() == Some(&new_value) {
            continue;
        }
        current.insert(key.clone(), new_value.clone());
        changes.insert(
            key,
            ValueChange {
                old_value,
                new_value: Some(new_value),
            },
        );
    }

    if changes.is_empty() {
        None
    } else {
        Some(StorageChange { namespace, changes })
    }
}

/// Select `keys` out of `current`, omitting absent ones.
pub(crate) fn select(current: &Map<String, Value>, keys: &[&str]) -> Map<String, Value> {
    keys.iter()
        .filter_map(|k| current.get(*k).map(|v| (k.to_string(), v.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_apply_reports_only_changed_keys() {
        let mut current = map(json!({"enabled": true, "mode": "text-check"}));
        let change = apply(
            &mut current,
            map(json!({"enabled": true, "mode": "prompt-convert"})),
            Namespace::Sync,
        )
        .unwrap();

        assert_eq!(change.changed_keys(), vec!["mode".to_string()]);
        let mode = &change.changes["mode"];
        assert_eq!(mode.old_value, Some(json!("text-check")));
        assert_eq!(mode.new_value, Some(json!("prompt-convert")));
        assert_eq!(current["mode"], json!("prompt-convert"));
    }

    #[test]
    fn test_apply_identical_write_is_no_change() {
        let mut current = map(json!({"minLength": 10}));
        assert!(apply(&mut current, map(json!({"minLength": 10})), Namespace::Sync).is_none());
    }

    #[test]
    fn test_apply_new_key_has_no_old_value() {
        let mut current = Map::new();
        let change = apply(&mut current, map(json!({"apiKey": "k"})), Namespace::Local).unwrap();
        assert_eq!(change.namespace, Namespace::Local);
        assert_eq!(change.changes["apiKey"].old_value, None);
    }

    #[test]
    fn test_select_omits_absent_keys() {
        let current = map(json!({"enabled": false}));
        let selected = select(&current, &["enabled", "apiKey"]);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected["enabled"], json!(false));
    }
}
