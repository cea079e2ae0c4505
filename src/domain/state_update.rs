//! Per-object attribute deltas.
//!
//! A [`StateUpdate`] carries the full current snapshot of one object's
//! attributes together with the subset of keys that changed in this delta.
//! The constructor enforces `updated_keys ⊆ keys(current_state)`.

use std::collections::{HashMap, HashSet};

use crate::error::{ConsoleError, Result};

/// Attribute snapshot of one object plus the keys changed in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateUpdate {
    sender_handle: String,
    object: String,
    current_state: HashMap<String, String>,
    updated_keys: HashSet<String>,
}

impl StateUpdate {
    /// Builds an update, validating that every changed key is present in
    /// the snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::InvalidUpdate`] listing the offending keys
    /// (sorted) if `updated_keys` names a key absent from `current_state`.
    pub fn new(
        sender_handle: impl Into<String>,
        object: impl Into<String>,
        current_state: HashMap<String, String>,
        updated_keys: HashSet<String>,
    ) -> Result<Self> {
        let object = object.into();
        let mut unknown: Vec<String> = updated_keys
            .iter()
            .filter(|k| !current_state.contains_key(*k))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            unknown.sort();
            return Err(ConsoleError::InvalidUpdate {
                object,
                keys: unknown,
            });
        }
        Ok(Self {
            sender_handle: sender_handle.into(),
            object,
            current_state,
            updated_keys,
        })
    }

    /// Handle of the client whose action caused this update.
    #[must_use]
    pub fn sender_handle(&self) -> &str {
        &self.sender_handle
    }

    /// Object path the update refers to (e.g. `slice 0`).
    #[must_use]
    pub fn object(&self) -> &str {
        &self.object
    }

    /// Full attribute snapshot after the change.
    #[must_use]
    pub fn current_state(&self) -> &HashMap<String, String> {
        &self.current_state
    }

    /// Returns `true` if `key` changed in this delta.
    #[must_use]
    pub fn is_updated(&self, key: &str) -> bool {
        self.updated_keys.contains(key)
    }

    /// Returns the snapshot as `(key, value, changed)` triples sorted by key.
    ///
    /// Rendering goes through this so map iteration order never leaks into
    /// the output.
    #[must_use]
    pub fn sorted_entries(&self) -> Vec<(&str, &str, bool)> {
        let mut entries: Vec<(&str, &str, bool)> = self
            .current_state
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str(), self.updated_keys.contains(k)))
            .collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn state(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn keys(names: &[&str]) -> HashSet<String> {
        names.iter().map(|k| (*k).to_string()).collect()
    }

    #[test]
    fn rejects_updated_key_missing_from_state() {
        let result = StateUpdate::new(
            "0x1",
            "slice 0",
            state(&[("freq", "14.074")]),
            keys(&["mode", "freq", "agc"]),
        );
        let Err(ConsoleError::InvalidUpdate { object, keys }) = result else {
            panic!("expected invalid update");
        };
        assert_eq!(object, "slice 0");
        assert_eq!(keys, vec!["agc".to_string(), "mode".to_string()]);
    }

    #[test]
    fn accepts_subset() {
        let Ok(upd) = StateUpdate::new(
            "0x1",
            "slice 0",
            state(&[("freq", "14.074"), ("mode", "DIGU")]),
            keys(&["mode"]),
        ) else {
            panic!("valid update");
        };
        assert!(upd.is_updated("mode"));
        assert!(!upd.is_updated("freq"));
    }

    #[test]
    fn sorted_entries_are_lexicographic() {
        let Ok(upd) = StateUpdate::new(
            "H1",
            "OBJ",
            state(&[("zeta", "3"), ("alpha", "1"), ("Mid", "x"), ("beta", "2")]),
            keys(&["beta"]),
        ) else {
            panic!("valid update");
        };
        let order: Vec<&str> = upd.sorted_entries().iter().map(|e| e.0).collect();
        assert_eq!(order, vec!["Mid", "alpha", "beta", "zeta"]);
        assert!(upd.sorted_entries().iter().any(|e| e.0 == "beta" && e.2));
    }

    #[test]
    fn empty_state_is_valid() {
        let Ok(upd) = StateUpdate::new("H1", "OBJ", HashMap::new(), HashSet::new()) else {
            panic!("valid update");
        };
        assert!(upd.sorted_entries().is_empty());
    }
}
