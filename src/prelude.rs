//! Convenient re-exports for glob imports.
//!
//! ```rust
//! use entity_caps::prelude::*;
//!
//! let info = DiscoInfo::new().with_feature("urn:xmpp:ping");
//! let hash = info.verification_hash(HashAlgorithm::Sha1);
//! ```

pub use crate::{
    // Data model
    CapsAdvertisement, CapsHash, DataForm, DiscoInfo, FormField, HashAlgorithm, Identity,
    // Operations
    canonicalize,
    // Errors
    CapsError,
    // Constants
    CACHE_KEY_PREFIX, FORM_TYPE, NS_CAPS, NS_DATA_FORMS, NS_DISCO_INFO,
};
