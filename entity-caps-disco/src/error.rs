//! Custom error types for discovery operations.

use std::fmt;

/// Errors that can occur while discovering or caching capabilities.
///
/// None of these escape [`DiscoveryResolver::resolve`](crate::DiscoveryResolver::resolve);
/// they surface to collaborators implementing the transport and store traits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoError {
    /// No disco#info reply arrived in time.
    Timeout {
        /// The entity that was queried
        entity_id: String,
    },
    /// The transport could not deliver the query (disconnect, closed stream).
    Transport {
        /// The entity that was queried
        entity_id: String,
        /// Description of the transport failure
        reason: String,
    },
    /// The entity answered with an error stanza.
    ErrorReply {
        /// The entity that was queried
        entity_id: String,
        /// Defined condition of the error (e.g. `item-not-found`)
        condition: String,
    },
    /// The key/value store refused a write.
    Store {
        /// The key being written
        key: String,
        /// Description of the store failure
        reason: String,
    },
    /// A payload could not be encoded for the store.
    Serialization {
        /// Description of the encoding failure
        reason: String,
    },
}

impl fmt::Display for DiscoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout { entity_id } => {
                write!(
                    f,
                    "disco#info query to '{entity_id}' timed out; the entity is treated as having no known capabilities"
                )
            }
            Self::Transport { entity_id, reason } => {
                write!(f, "could not query '{entity_id}': {reason}")
            }
            Self::ErrorReply {
                entity_id,
                condition,
            } => {
                write!(f, "'{entity_id}' answered disco#info with error '{condition}'")
            }
            Self::Store { key, reason } => {
                write!(f, "failed to store capability entry '{key}': {reason}")
            }
            Self::Serialization { reason } => {
                write!(f, "failed to encode capability payload: {reason}")
            }
        }
    }
}

impl std::error::Error for DiscoError {}

impl DiscoError {
    /// Creates a `Timeout` error.
    #[must_use]
    pub fn timeout(entity_id: impl Into<String>) -> Self {
        Self::Timeout {
            entity_id: entity_id.into(),
        }
    }

    /// Creates a `Transport` error.
    #[must_use]
    pub fn transport(entity_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Transport {
            entity_id: entity_id.into(),
            reason: reason.into(),
        }
    }

    /// Creates an `ErrorReply` error.
    #[must_use]
    pub fn error_reply(entity_id: impl Into<String>, condition: impl Into<String>) -> Self {
        Self::ErrorReply {
            entity_id: entity_id.into(),
            condition: condition.into(),
        }
    }

    /// Creates a `Store` error.
    #[must_use]
    pub fn store(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Store {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Creates a `Serialization` error.
    #[must_use]
    pub fn serialization(reason: impl Into<String>) -> Self {
        Self::Serialization {
            reason: reason.into(),
        }
    }

    /// Returns true if this error indicates the query timed out.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns true if the failure happened on the network side of a
    /// resolution rather than in the local store.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Transport { .. } | Self::ErrorReply { .. }
        )
    }
}

impl From<serde_json::Error> for DiscoError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_error_display() {
        let err = DiscoError::timeout("romeo@montague.lit/orchard");
        assert!(err.to_string().contains("timed out"));
        assert!(err.is_timeout());
        assert!(err.is_network());
    }

    #[test]
    fn transport_error_display() {
        let err = DiscoError::transport("montague.lit", "stream closed");
        assert!(err.to_string().contains("stream closed"));
        assert!(err.is_network());
    }

    #[test]
    fn error_reply_display() {
        let err = DiscoError::error_reply("montague.lit", "item-not-found");
        assert!(err.to_string().contains("'item-not-found'"));
        assert!(!err.is_timeout());
    }

    #[test]
    fn store_error_is_not_network() {
        let err = DiscoError::store("caps_abc=", "quota exceeded");
        assert!(err.to_string().contains("caps_abc="));
        assert!(!err.is_network());
    }

    #[test]
    fn serialization_from_serde_json() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err = DiscoError::from(json_err);
        assert!(matches!(err, DiscoError::Serialization { .. }));
    }
}
