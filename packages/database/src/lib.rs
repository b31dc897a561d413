#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory key lookup store and submitted-observation list.
//!
//! Nothing here persists across process restarts. The store is an
//! explicitly constructed value injected into handlers through the
//! application state, never a process-wide singleton.

use std::collections::BTreeMap;
use std::sync::Mutex;

use plant_map_observation_models::SubmittedObservation;

/// A purely in-memory store: a key/value map plus an append-only list
/// of user-submitted observations.
///
/// Interior mutability via `Mutex` lets one shared instance back all
/// request handlers.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<BTreeMap<String, serde_json::Value>>,
    observations: Mutex<Vec<SubmittedObservation>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key` and returns the stored value.
    ///
    /// # Panics
    ///
    /// Panics if the store mutex is poisoned.
    pub fn put(&self, key: impl Into<String>, value: serde_json::Value) -> serde_json::Value {
        let mut data = self.data.lock().expect("store mutex poisoned");
        data.insert(key.into(), value.clone());
        value
    }

    /// Returns the value stored under `key`, if any.
    ///
    /// # Panics
    ///
    /// Panics if the store mutex is poisoned.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.data
            .lock()
            .expect("store mutex poisoned")
            .get(key)
            .cloned()
    }

    /// Whether a value is stored under `key`.
    ///
    /// # Panics
    ///
    /// Panics if the store mutex is poisoned.
    #[must_use]
    pub fn exists(&self, key: &str) -> bool {
        self.data
            .lock()
            .expect("store mutex poisoned")
            .contains_key(key)
    }

    /// Removes and returns the value under `key`; `None` when absent.
    ///
    /// # Panics
    ///
    /// Panics if the store mutex is poisoned.
    pub fn delete(&self, key: &str) -> Option<serde_json::Value> {
        self.data.lock().expect("store mutex poisoned").remove(key)
    }

    /// A full snapshot of the key/value mapping.
    ///
    /// # Panics
    ///
    /// Panics if the store mutex is poisoned.
    #[must_use]
    pub fn all(&self) -> BTreeMap<String, serde_json::Value> {
        self.data.lock().expect("store mutex poisoned").clone()
    }

    /// Appends a user-submitted observation.
    ///
    /// # Panics
    ///
    /// Panics if the observations mutex is poisoned.
    pub fn add_observation(&self, observation: SubmittedObservation) {
        self.observations
            .lock()
            .expect("observations mutex poisoned")
            .push(observation);
    }

    /// A snapshot of all submitted observations, in submission order.
    ///
    /// # Panics
    ///
    /// Panics if the observations mutex is poisoned.
    #[must_use]
    pub fn observations(&self) -> Vec<SubmittedObservation> {
        self.observations
            .lock()
            .expect("observations mutex poisoned")
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn put_get_exists_delete_roundtrip() {
        let store = MemoryStore::new();

        assert!(!store.exists("a"));
        assert_eq!(store.put("a", json!(1)), json!(1));
        assert!(store.exists("a"));
        assert_eq!(store.get("a"), Some(json!(1)));

        assert_eq!(store.delete("a"), Some(json!(1)));
        assert_eq!(store.delete("a"), None);
        assert!(!store.exists("a"));
    }

    #[test]
    fn all_returns_full_snapshot() {
        let store = MemoryStore::new();
        store.put("a", json!("x"));
        store.put("b", json!({"n": 2}));

        let all = store.all();
        assert_eq!(all.len(), 2);
        assert_eq!(all["b"], json!({"n": 2}));
    }

    #[test]
    fn observations_append_in_order() {
        let store = MemoryStore::new();
        for name in ["Quercus alba", "Acer rubrum"] {
            store.add_observation(SubmittedObservation {
                scientific_name: name.to_string(),
                common_name: String::new(),
                observed_on: "2021-06-14".to_string(),
                park_name: "Lincoln Park".to_string(),
                image_url: None,
            });
        }

        let names: Vec<String> = store
            .observations()
            .into_iter()
            .map(|o| o.scientific_name)
            .collect();
        assert_eq!(names, vec!["Quercus alba", "Acer rubrum"]);
    }
}
