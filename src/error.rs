//! Error types for capability hashing and advertisement parsing.

use std::fmt;

/// Errors that can occur when interpreting entity capability data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapsError {
    /// The advertised verification hash is empty or whitespace.
    EmptyHash,
    /// The hash algorithm name is not one this crate can compute.
    UnsupportedAlgorithm {
        /// The algorithm name as advertised
        name: String,
    },
    /// The advertisement lacks a `hash` attribute (pre-1.4 format).
    LegacyAdvertisement {
        /// The advertised node, if any
        node: String,
    },
    /// The advertisement lacks a `node` attribute.
    MissingNode,
}

impl fmt::Display for CapsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyHash => {
                write!(f, "capability hash is empty; the 'ver' attribute must carry a digest")
            }
            Self::UnsupportedAlgorithm { name } => {
                write!(
                    f,
                    "unsupported capability hash algorithm '{name}'; expected 'sha-1' or 'sha-256'"
                )
            }
            Self::LegacyAdvertisement { node } => {
                write!(
                    f,
                    "legacy capability advertisement from node '{node}' has no 'hash' attribute and cannot be verified"
                )
            }
            Self::MissingNode => {
                write!(f, "capability advertisement must have a 'node' attribute")
            }
        }
    }
}

impl std::error::Error for CapsError {}

impl CapsError {
    /// Creates an `UnsupportedAlgorithm` error.
    #[must_use]
    pub fn unsupported_algorithm(name: impl Into<String>) -> Self {
        Self::UnsupportedAlgorithm { name: name.into() }
    }

    /// Creates a `LegacyAdvertisement` error.
    #[must_use]
    pub fn legacy_advertisement(node: impl Into<String>) -> Self {
        Self::LegacyAdvertisement { node: node.into() }
    }

    /// Returns true if the advertisement should simply be ignored rather
    /// than reported, as for pre-1.4 clients.
    #[must_use]
    pub const fn is_legacy(&self) -> bool {
        matches!(self, Self::LegacyAdvertisement { .. })
    }
}
