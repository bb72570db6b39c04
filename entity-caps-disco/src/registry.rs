//! Per-entity capability state and change notification.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

use entity_caps::{CapsHash, DiscoInfo, Identity};
use tracing::trace;

use crate::{CapabilityListener, DiscoveryRecord};

/// What changed for an entity in one resolution.
///
/// Diffs are taken against the entity's previous payload; the first
/// resolution of an entity reports everything as added.
#[derive(Debug, Clone)]
pub struct CapabilityChange {
    /// The resolved entity.
    pub entity_id: String,
    /// The record produced by the resolution.
    pub record: DiscoveryRecord,
    /// Hash the entity resolved to before, if it had one.
    pub previous_hash: Option<CapsHash>,
    /// True if the entity had no capabilities recorded before.
    pub first_seen: bool,
    /// Features present now but not before.
    pub features_added: BTreeSet<String>,
    /// Features present before but not now.
    pub features_removed: BTreeSet<String>,
    /// Identity tokens present now but not before.
    pub identities_added: BTreeSet<String>,
    /// Identity tokens present before but not now.
    pub identities_removed: BTreeSet<String>,
}

impl CapabilityChange {
    fn between(previous: Option<&DiscoveryRecord>, record: &DiscoveryRecord) -> Self {
        let empty = DiscoInfo::default();
        let before = previous.map_or(&empty, DiscoveryRecord::payload);
        let after = record.payload();

        let features_before = feature_set(before);
        let features_after = feature_set(after);
        let identities_before = identity_set(before);
        let identities_after = identity_set(after);

        Self {
            entity_id: record.entity_id().to_string(),
            record: record.clone(),
            previous_hash: previous.and_then(|p| p.capability_hash().cloned()),
            first_seen: previous.is_none(),
            features_added: &features_after - &features_before,
            features_removed: &features_before - &features_after,
            identities_added: &identities_after - &identities_before,
            identities_removed: &identities_before - &identities_after,
        }
    }

    /// Returns true if no feature or identity changed.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.features_added.is_empty()
            && self.features_removed.is_empty()
            && self.identities_added.is_empty()
            && self.identities_removed.is_empty()
    }
}

fn feature_set(info: &DiscoInfo) -> BTreeSet<String> {
    info.features.iter().cloned().collect()
}

fn identity_set(info: &DiscoInfo) -> BTreeSet<String> {
    info.identities.iter().map(Identity::token).collect()
}

/// Tracks the capabilities each entity last resolved to.
///
/// This is the display side of discovery: the cache answers "what does this
/// hash mean", the registry answers "what can this entity do right now".
#[derive(Default)]
pub struct EntityRegistry {
    /// Entity identifier -> latest record
    entries: RwLock<HashMap<String, DiscoveryRecord>>,
    /// Listeners for every entity
    listeners: RwLock<Vec<Arc<dyn CapabilityListener>>>,
    /// Entity identifier -> listeners for that entity only
    entity_listeners: RwLock<HashMap<String, Vec<Arc<dyn CapabilityListener>>>>,
}

impl EntityRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener for every entity.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn add_listener(&self, listener: Arc<dyn CapabilityListener>) {
        self.listeners.write().expect("lock poisoned").push(listener);
    }

    /// Registers a listener for one entity.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn add_entity_listener(&self, entity_id: impl Into<String>, listener: Arc<dyn CapabilityListener>) {
        self.entity_listeners
            .write()
            .expect("lock poisoned")
            .entry(entity_id.into())
            .or_default()
            .push(listener);
    }

    /// Removes every listener registered for `entity_id`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn remove_entity_listeners(&self, entity_id: &str) {
        self.entity_listeners
            .write()
            .expect("lock poisoned")
            .remove(entity_id);
    }

    /// Stores `record` as the entity's current capabilities and notifies
    /// listeners.
    ///
    /// Listeners are called on every resolution, including ones that change
    /// nothing, after the registry lock has been released.
    ///
    /// # Panics
    ///
    /// Panics if any of the internal locks are poisoned.
    pub fn record(&self, record: &DiscoveryRecord) -> CapabilityChange {
        let change = {
            let mut entries = self.entries.write().expect("lock poisoned");
            let previous = entries.insert(record.entity_id().to_string(), record.clone());
            CapabilityChange::between(previous.as_ref(), record)
        };

        let mut listeners = self.listeners.read().expect("lock poisoned").clone();
        if let Some(specific) = self
            .entity_listeners
            .read()
            .expect("lock poisoned")
            .get(record.entity_id())
        {
            listeners.extend(specific.iter().cloned());
        }

        trace!(
            entity = %change.entity_id,
            listeners = listeners.len(),
            added = change.features_added.len(),
            removed = change.features_removed.len(),
            "dispatching capability change"
        );
        for listener in &listeners {
            listener.capabilities_resolved(&change);
        }
        change
    }

    /// Returns the entity's current capabilities.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn capabilities(&self, entity_id: &str) -> Option<DiscoveryRecord> {
        self.entries
            .read()
            .expect("lock poisoned")
            .get(entity_id)
            .cloned()
    }

    /// Returns the hash the entity last resolved to.
    #[must_use]
    pub fn hash_of(&self, entity_id: &str) -> Option<CapsHash> {
        self.capabilities(entity_id)
            .and_then(|record| record.capability_hash().cloned())
    }

    /// Returns every entity currently resolved to `hash`, sorted.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn entities_with_hash(&self, hash: &CapsHash) -> Vec<String> {
        let entries = self.entries.read().expect("lock poisoned");
        let mut entities: Vec<String> = entries
            .iter()
            .filter(|(_, record)| record.capability_hash() == Some(hash))
            .map(|(entity, _)| entity.clone())
            .collect();
        entities.sort_unstable();
        entities
    }

    /// Forgets an entity, e.g. when it goes offline.
    ///
    /// Cached payloads are not affected.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn remove(&self, entity_id: &str) -> Option<DiscoveryRecord> {
        self.entries.write().expect("lock poisoned").remove(entity_id)
    }

    /// Forgets every entity. Listeners stay registered.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn clear(&self) {
        self.entries.write().expect("lock poisoned").clear();
    }

    /// Returns the number of entities with known capabilities.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().expect("lock poisoned").len()
    }

    /// Returns true if no entity has known capabilities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
