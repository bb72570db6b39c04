//! Entity capability hashing for XMPP service discovery (XEP-0115).
//!
//! This crate computes the verification string and capability hash of an
//! entity's disco#info reply and interprets the capability advertisements
//! carried in presence.
//!
//! # Overview
//!
//! An entity advertises a short hash of everything it supports. Receivers
//! that have already seen that hash reuse the cached capability set; others
//! query the entity once and verify the reply by recomputing the hash:
//!
//! ```text
//! ver = BASE64(SHA1(identity<... feature<... form...))
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use entity_caps::{DiscoInfo, HashAlgorithm, Identity};
//!
//! let info = DiscoInfo::new()
//!     .with_identity(Identity::new("client", "web").with_name("Jappix"))
//!     .with_features(["urn:xmpp:ping"]);
//!
//! assert_eq!(info.canonical_string(), "client/web//Jappix<urn:xmpp:ping<");
//!
//! let hash = info.verification_hash(HashAlgorithm::Sha1);
//! assert_eq!(hash.cache_key(), format!("caps_{hash}"));
//! ```
//!
//! # Advertisements
//!
//! ```rust
//! use entity_caps::CapsAdvertisement;
//!
//! // Pre-1.4 advertisements carry no hash attribute and are ignored.
//! let legacy = CapsAdvertisement::parse(Some("http://psi-im.org/caps"), Some("0.11"), None);
//! assert!(legacy.unwrap_err().is_legacy());
//! ```
//!
//! # Features
//!
//! - `serde`: `Serialize`/`Deserialize` for the data model, used to persist
//!   disco#info replies in string key/value stores.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod advertisement;
mod canonical;
mod constants;
mod disco_info;
mod error;
mod form;
mod hash;
mod identity;
pub mod prelude;

pub use advertisement::CapsAdvertisement;
pub use canonical::canonicalize;
pub use constants::{
    CACHE_KEY_PREFIX, FORM_TYPE, IDENTITY_SEPARATOR, NS_CAPS, NS_DATA_FORMS, NS_DISCO_INFO,
    TOKEN_SEPARATOR,
};
pub use disco_info::DiscoInfo;
pub use error::CapsError;
pub use form::{DataForm, FormField};
pub use hash::{CapsHash, HashAlgorithm};
pub use identity::Identity;
