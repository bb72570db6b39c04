//! Capability hash computation.

use std::fmt;
use std::str::FromStr;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::constants::CACHE_KEY_PREFIX;
use crate::error::CapsError;

/// Digest algorithm used to turn a verification string into a hash.
///
/// The algorithm is a parameter of the hash computation only; the
/// verification string layout does not depend on it.
///
/// # Examples
///
/// ```
/// use entity_caps::HashAlgorithm;
///
/// let hash = HashAlgorithm::Sha1.digest("client/web//Jappix<urn:xmpp:ping<");
/// assert_eq!(hash.as_str(), "KbjoKEv4QbJOdAIvOZg+6mxiLRo=");
///
/// let parsed: HashAlgorithm = "sha-256".parse().unwrap();
/// assert_eq!(parsed, HashAlgorithm::Sha256);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// SHA-1 (RFC 3174), the algorithm deployed clients advertise
    #[default]
    Sha1,
    /// SHA-256 (FIPS 180-4)
    Sha256,
}

impl HashAlgorithm {
    /// Returns the IANA hash function text name, as used in the `hash`
    /// attribute of a caps element.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sha1 => "sha-1",
            Self::Sha256 => "sha-256",
        }
    }

    /// Hashes a verification string and base64-encodes the binary digest.
    #[must_use]
    pub fn digest(self, canonical: &str) -> CapsHash {
        let bytes = match self {
            Self::Sha1 => Sha1::digest(canonical.as_bytes()).to_vec(),
            Self::Sha256 => Sha256::digest(canonical.as_bytes()).to_vec(),
        };
        CapsHash(STANDARD.encode(bytes))
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = CapsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sha-1" => Ok(Self::Sha1),
            "sha-256" => Ok(Self::Sha256),
            _ => Err(CapsError::unsupported_algorithm(s)),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for HashAlgorithm {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for HashAlgorithm {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Deserialize;
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// A capability hash: the base64 digest of a verification string.
///
/// Used as a content address: entities that advertise the same hash share
/// one cached capability set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CapsHash(String);

impl CapsHash {
    /// Parses an advertised hash value.
    ///
    /// The value is taken verbatim apart from surrounding whitespace; it is
    /// not validated as base64 since it is only ever compared and used as a
    /// key.
    ///
    /// # Errors
    ///
    /// Returns `CapsError::EmptyHash` if the value is empty or whitespace.
    pub fn parse(input: &str) -> Result<Self, CapsError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(CapsError::EmptyHash);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the hash string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the key under which this hash is stored in a string
    /// key/value store (`caps_<hash>`).
    #[must_use]
    pub fn cache_key(&self) -> String {
        format!("{CACHE_KEY_PREFIX}{}", self.0)
    }
}

impl fmt::Display for CapsHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CapsHash {
    type Err = CapsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for CapsHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
