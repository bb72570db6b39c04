//! Collaborator interfaces: transport, storage and notification.

use async_trait::async_trait;
use entity_caps::DiscoInfo;
use uuid::Uuid;

use crate::{CapabilityChange, DiscoError, ServerFeature};

/// A disco#info request, identified so the reply can be correlated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoQuery {
    id: String,
    to: String,
    node: Option<String>,
}

impl DiscoQuery {
    /// Creates a query with a fresh request identifier.
    #[must_use]
    pub fn new(to: impl Into<String>, node: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            to: to.into(),
            node,
        }
    }

    /// Returns the request identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the entity being queried.
    #[must_use]
    pub fn to(&self) -> &str {
        &self.to
    }

    /// Returns the disco node, if the query names one.
    #[must_use]
    pub fn node(&self) -> Option<&str> {
        self.node.as_deref()
    }
}

/// Sends disco#info queries and parses the replies.
///
/// Implementations own stanza serialization and reply correlation; the
/// resolver only sees the typed payload or an error.
#[async_trait]
pub trait DiscoTransport: Send + Sync {
    /// Sends `query` and waits for the matching reply.
    ///
    /// # Errors
    ///
    /// Returns `DiscoError` if:
    /// - The entity answered with an error stanza (`ErrorReply`)
    /// - The query could not be sent or the stream closed (`Transport`)
    /// - The transport gave up waiting (`Timeout`)
    async fn query_info(&self, query: &DiscoQuery) -> Result<DiscoInfo, DiscoError>;
}

/// Persistent string key/value storage.
///
/// Mirrors browser Web Storage: synchronous, string keys and values.
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `DiscoError::Store` if the store cannot accept the write even
    /// after its own recovery.
    fn set(&self, key: &str, value: &str) -> Result<(), DiscoError>;
}

/// Receives resolved capabilities for display.
pub trait CapabilityListener: Send + Sync {
    /// Called after every successful resolution of an entity.
    fn capabilities_resolved(&self, change: &CapabilityChange);
}

/// Enables or disables UI behaviour that depends on a server feature.
///
/// Called for every tracked feature each time the home server's
/// capabilities are applied, so implementations must be idempotent.
pub trait FeatureEffects: Send + Sync {
    /// Applies the current state of one feature.
    fn feature_toggled(&self, feature: ServerFeature, enabled: bool);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queries_get_distinct_ids() {
        let a = DiscoQuery::new("capulet.lit", None);
        let b = DiscoQuery::new("capulet.lit", None);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.to(), "capulet.lit");
    }

    #[test]
    fn query_keeps_node() {
        let query = DiscoQuery::new(
            "juliet@capulet.lit/balcony",
            Some("https://jappix.com/#KbjoKEv4QbJOdAIvOZg+6mxiLRo=".to_string()),
        );
        assert_eq!(query.node(), Some("https://jappix.com/#KbjoKEv4QbJOdAIvOZg+6mxiLRo="));
    }
}
