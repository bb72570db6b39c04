//! Resolved capability records.

use std::time::SystemTime;

use entity_caps::{CapsHash, DiscoInfo};
use serde::{Deserialize, Serialize};

/// Where a record's payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordSource {
    /// Served from the capability cache without a network round trip.
    Cache,
    /// Fetched with a disco#info query.
    Network,
}

/// The outcome of resolving one entity's capabilities.
///
/// Records are keyed by capability hash, not by entity: every entity that
/// advertises the same hash shares one cached payload.
///
/// # Examples
///
/// ```
/// use entity_caps::DiscoInfo;
/// use entity_caps_disco::{DiscoveryRecord, RecordSource};
///
/// let payload = DiscoInfo::new().with_feature("urn:xmpp:ping");
/// let record = DiscoveryRecord::new("juliet@capulet.lit/balcony", None, payload, RecordSource::Network);
///
/// assert!(record.capability_hash().is_none());
/// assert!(record.payload().has_feature("urn:xmpp:ping"));
/// ```
#[derive(Debug, Clone)]
pub struct DiscoveryRecord {
    /// The entity that was resolved.
    entity_id: String,
    /// Hash the payload is cached under; None when nothing was advertised.
    capability_hash: Option<CapsHash>,
    /// The disco#info payload.
    payload: DiscoInfo,
    /// When the record was produced.
    resolved_at: SystemTime,
    source: RecordSource,
}

impl DiscoveryRecord {
    /// Creates a record resolved now.
    #[must_use]
    pub fn new(
        entity_id: impl Into<String>,
        capability_hash: Option<CapsHash>,
        payload: DiscoInfo,
        source: RecordSource,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            capability_hash,
            payload,
            resolved_at: SystemTime::now(),
            source,
        }
    }

    /// Sets the resolution time (for testing/simulation).
    #[must_use]
    pub fn with_resolved_at(mut self, resolved_at: SystemTime) -> Self {
        self.resolved_at = resolved_at;
        self
    }

    /// Returns the entity identifier.
    #[must_use]
    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    /// Returns the capability hash, if the payload is cached under one.
    #[must_use]
    pub fn capability_hash(&self) -> Option<&CapsHash> {
        self.capability_hash.as_ref()
    }

    /// Returns the disco#info payload.
    #[must_use]
    pub fn payload(&self) -> &DiscoInfo {
        &self.payload
    }

    /// Returns the resolution time.
    #[must_use]
    pub fn resolved_at(&self) -> SystemTime {
        self.resolved_at
    }

    /// Returns where the payload came from.
    #[must_use]
    pub const fn source(&self) -> RecordSource {
        self.source
    }

    /// Returns true if the payload was served from the cache.
    #[must_use]
    pub fn is_cached(&self) -> bool {
        self.source == RecordSource::Cache
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn payload() -> DiscoInfo {
        DiscoInfo::new().with_feature("urn:xmpp:ping")
    }

    #[test]
    fn new_record_is_resolved_now() {
        let record = DiscoveryRecord::new("capulet.lit", None, payload(), RecordSource::Network);
        let age = SystemTime::now()
            .duration_since(record.resolved_at())
            .unwrap_or_default();
        assert!(age < Duration::from_secs(5));
        assert!(!record.is_cached());
    }

    #[test]
    fn cached_record_keeps_hash() {
        let hash = CapsHash::parse("KbjoKEv4QbJOdAIvOZg+6mxiLRo=").unwrap();
        let record = DiscoveryRecord::new(
            "juliet@capulet.lit/balcony",
            Some(hash.clone()),
            payload(),
            RecordSource::Cache,
        );
        assert_eq!(record.capability_hash(), Some(&hash));
        assert_eq!(record.entity_id(), "juliet@capulet.lit/balcony");
        assert!(record.is_cached());
    }

    #[test]
    fn with_resolved_at_overrides_time() {
        let past = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
        let record = DiscoveryRecord::new("capulet.lit", None, payload(), RecordSource::Network)
            .with_resolved_at(past);
        assert_eq!(record.resolved_at(), past);
    }

    #[test]
    fn source_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&RecordSource::Cache).unwrap(), "\"cache\"");
        let source: RecordSource = serde_json::from_str("\"network\"").unwrap();
        assert_eq!(source, RecordSource::Network);
    }
}
