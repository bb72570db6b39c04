//! Capability advertisements carried in presence.

use std::fmt;

use crate::disco_info::DiscoInfo;
use crate::error::CapsError;
use crate::hash::{CapsHash, HashAlgorithm};

/// The content of a `<c xmlns='http://jabber.org/protocol/caps'/>` element.
///
/// An entity advertises its capability hash with the software `node` that
/// produced it and the `hash` algorithm used. Receivers look the hash up in
/// their cache and, on a miss, query `node#ver` for the full disco#info.
///
/// # Examples
///
/// ```
/// use entity_caps::{CapsAdvertisement, HashAlgorithm};
///
/// let caps = CapsAdvertisement::parse(
///     Some("https://jappix.com/"),
///     Some("KbjoKEv4QbJOdAIvOZg+6mxiLRo="),
///     Some("sha-1"),
/// ).unwrap();
///
/// assert_eq!(caps.hash_algorithm(), HashAlgorithm::Sha1);
/// assert_eq!(caps.disco_node(), "https://jappix.com/#KbjoKEv4QbJOdAIvOZg+6mxiLRo=");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CapsAdvertisement {
    node: String,
    ver: CapsHash,
    hash: HashAlgorithm,
}

impl CapsAdvertisement {
    /// Creates an advertisement from already validated parts.
    #[must_use]
    pub fn new(node: impl Into<String>, ver: CapsHash, hash: HashAlgorithm) -> Self {
        Self {
            node: node.into(),
            ver,
            hash,
        }
    }

    /// Parses the `node`, `ver` and `hash` attributes of a caps element.
    ///
    /// # Errors
    ///
    /// Returns `CapsError` if:
    /// - `hash` is missing or blank (`LegacyAdvertisement`, pre-1.4 format)
    /// - `node` is missing or blank (`MissingNode`)
    /// - `ver` is missing or blank (`EmptyHash`)
    /// - `hash` names an algorithm this crate cannot compute
    ///   (`UnsupportedAlgorithm`)
    pub fn parse(
        node: Option<&str>,
        ver: Option<&str>,
        hash: Option<&str>,
    ) -> Result<Self, CapsError> {
        let node = node.map(str::trim).filter(|n| !n.is_empty());

        let Some(hash) = hash.map(str::trim).filter(|h| !h.is_empty()) else {
            return Err(CapsError::legacy_advertisement(node.unwrap_or_default()));
        };
        let node = node.ok_or(CapsError::MissingNode)?;
        let ver = CapsHash::parse(ver.unwrap_or_default())?;
        let hash = hash.parse()?;

        Ok(Self::new(node, ver, hash))
    }

    /// Builds the advertisement for our own capability set.
    #[must_use]
    pub fn for_disco_info(node: impl Into<String>, info: &DiscoInfo, hash: HashAlgorithm) -> Self {
        Self::new(node, info.verification_hash(hash), hash)
    }

    /// Returns the software node.
    #[must_use]
    pub fn node(&self) -> &str {
        &self.node
    }

    /// Returns the advertised capability hash.
    #[must_use]
    pub const fn ver(&self) -> &CapsHash {
        &self.ver
    }

    /// Returns the hash algorithm.
    #[must_use]
    pub const fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash
    }

    /// Returns the node to name in the disco#info query (`node#ver`).
    #[must_use]
    pub fn disco_node(&self) -> String {
        format!("{}#{}", self.node, self.ver)
    }

    /// Returns true if `info` hashes to the advertised value.
    #[must_use]
    pub fn matches(&self, info: &DiscoInfo) -> bool {
        info.verification_hash(self.hash) == self.ver
    }
}

impl fmt::Display for CapsAdvertisement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.disco_node(), self.hash)
    }
}
