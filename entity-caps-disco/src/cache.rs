//! Hash-keyed capability cache over a key/value store.

use std::fmt;
use std::sync::Arc;

use entity_caps::{CapsHash, DiscoInfo};
use tracing::{info, warn};

use crate::{DiscoError, KeyValueStore};

/// Maps capability hashes to disco#info payloads.
///
/// Entries are stored as JSON under `caps_<hash>` and never expire: a hash
/// always describes the same payload. Entries that fail to decode are
/// treated as absent.
#[derive(Clone)]
pub struct CapabilityCache {
    store: Arc<dyn KeyValueStore>,
}

impl CapabilityCache {
    /// Creates a cache backed by `store`.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Returns the payload cached under `hash`.
    #[must_use]
    pub fn get(&self, hash: &CapsHash) -> Option<DiscoInfo> {
        let key = hash.cache_key();
        let raw = self.store.get(&key)?;
        match serde_json::from_str(&raw) {
            Ok(info) => Some(info),
            Err(err) => {
                warn!(key = %key, error = %err, "discarding undecodable cache entry");
                None
            }
        }
    }

    /// Returns true if a decodable payload is cached under `hash`.
    #[must_use]
    pub fn contains(&self, hash: &CapsHash) -> bool {
        self.get(hash).is_some()
    }

    /// Stores `info` under `hash`, replacing any previous entry.
    ///
    /// Only the resolver writes, and only under a hash it computed itself.
    /// The reply's node is not part of the hashed content and is not stored.
    pub(crate) fn put(&self, hash: &CapsHash, info: &DiscoInfo) -> Result<(), DiscoError> {
        let key = hash.cache_key();
        let stored = DiscoInfo {
            node: None,
            ..info.clone()
        };
        let encoded = serde_json::to_string(&stored)?;
        self.store.set(&key, &encoded)?;
        info!(
            key = %key,
            features = info.features.len(),
            identities = info.identities.len(),
            "cached new capability set"
        );
        Ok(())
    }
}

impl fmt::Debug for CapabilityCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityCache").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use entity_caps::{HashAlgorithm, Identity};

    use super::*;
    use crate::MemoryStore;

    fn jappix() -> DiscoInfo {
        DiscoInfo::new()
            .with_identity(Identity::new("client", "web").with_name("Jappix"))
            .with_feature("urn:xmpp:ping")
    }

    #[test]
    fn round_trips_through_store() {
        let store = Arc::new(MemoryStore::new());
        let cache = CapabilityCache::new(store.clone());
        let info = jappix();
        let hash = info.verification_hash(HashAlgorithm::Sha1);

        cache.put(&hash, &info).unwrap();

        assert_eq!(cache.get(&hash), Some(info));
        assert!(store.get("caps_KbjoKEv4QbJOdAIvOZg+6mxiLRo=").is_some());
    }

    #[test]
    fn missing_entry_is_none() {
        let cache = CapabilityCache::new(Arc::new(MemoryStore::new()));
        let hash = CapsHash::parse("QgayPKawpkPSDYmwT/WM94uAlu0=").unwrap();
        assert!(cache.get(&hash).is_none());
        assert!(!cache.contains(&hash));
    }

    #[test]
    fn corrupt_entry_is_treated_as_absent() {
        let store = Arc::new(MemoryStore::new());
        store.set("caps_QgayPKawpkPSDYmwT/WM94uAlu0=", "{not json").unwrap();
        let cache = CapabilityCache::new(store);

        let hash = CapsHash::parse("QgayPKawpkPSDYmwT/WM94uAlu0=").unwrap();
        assert!(cache.get(&hash).is_none());
    }

    #[test]
    fn node_is_not_cached() {
        let cache = CapabilityCache::new(Arc::new(MemoryStore::new()));
        let info = jappix().with_node("https://jappix.com/#KbjoKEv4QbJOdAIvOZg+6mxiLRo=");
        let hash = info.verification_hash(HashAlgorithm::Sha1);

        cache.put(&hash, &info).unwrap();

        assert_eq!(cache.get(&hash), Some(jappix()));
    }

    #[test]
    fn put_replaces_existing_entry() {
        let cache = CapabilityCache::new(Arc::new(MemoryStore::new()));
        let hash = CapsHash::parse("QgayPKawpkPSDYmwT/WM94uAlu0=").unwrap();

        cache.put(&hash, &DiscoInfo::new()).unwrap();
        cache.put(&hash, &jappix()).unwrap();

        assert_eq!(cache.get(&hash), Some(jappix()));
    }
}
