//! In-memory key/value store.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::warn;

use crate::{DiscoError, KeyValueStore};

/// In-memory [`KeyValueStore`] with an optional entry limit.
///
/// When a write of a new key would exceed the limit, the store is flushed
/// and the write retried once, the way a browser client recovers from a full
/// local storage quota.
///
/// # Examples
///
/// ```
/// use entity_caps_disco::{KeyValueStore, MemoryStore};
///
/// let store = MemoryStore::with_max_entries(1);
/// store.set("a", "1").unwrap();
/// store.set("b", "2").unwrap();
///
/// assert!(store.get("a").is_none());
/// assert_eq!(store.get("b").as_deref(), Some("2"));
/// assert_eq!(store.flush_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    max_entries: Option<usize>,
    flushes: AtomicU64,
}

impl MemoryStore {
    /// Creates an unbounded store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that holds at most `max_entries` keys.
    #[must_use]
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            max_entries: Some(max_entries),
            ..Self::default()
        }
    }

    /// Returns the number of stored keys.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().expect("lock poisoned").len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns how many times the store flushed itself to make room.
    #[must_use]
    pub fn flush_count(&self) -> u64 {
        self.flushes.load(Ordering::Relaxed)
    }

    /// Removes every entry.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn clear(&self) {
        self.entries.write().expect("lock poisoned").clear();
    }

    fn has_room(&self, entries: &HashMap<String, String>, key: &str) -> bool {
        self.max_entries
            .is_none_or(|max| entries.len() < max || entries.contains_key(key))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().expect("lock poisoned").get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DiscoError> {
        let mut entries = self.entries.write().expect("lock poisoned");

        if !self.has_room(&entries, key) {
            warn!(
                entries = entries.len(),
                key = %key,
                "store is full, flushing before retry"
            );
            entries.clear();
            self.flushes.fetch_add(1, Ordering::Relaxed);

            if !self.has_room(&entries, key) {
                return Err(DiscoError::store(key, "store cannot hold any entries"));
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_store_keeps_everything() {
        let store = MemoryStore::new();
        for i in 0..100 {
            store.set(&format!("caps_{i}"), "{}").unwrap();
        }
        assert_eq!(store.len(), 100);
        assert_eq!(store.flush_count(), 0);
    }

    #[test]
    fn overwriting_a_key_does_not_flush() {
        let store = MemoryStore::with_max_entries(2);
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        store.set("b", "3").unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("b").as_deref(), Some("3"));
        assert_eq!(store.flush_count(), 0);
    }

    #[test]
    fn full_store_flushes_then_writes() {
        let store = MemoryStore::with_max_entries(2);
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        store.set("c", "3").unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("c").as_deref(), Some("3"));
        assert!(store.get("a").is_none());
        assert_eq!(store.flush_count(), 1);
    }

    #[test]
    fn zero_capacity_store_rejects_writes() {
        let store = MemoryStore::with_max_entries(0);
        let err = store.set("a", "1").unwrap_err();
        assert!(matches!(err, DiscoError::Store { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn clear_empties_store() {
        let store = MemoryStore::new();
        store.set("a", "1").unwrap();
        store.clear();
        assert!(store.is_empty());
    }
}
