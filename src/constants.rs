//! Protocol constants for entity capabilities.

/// Namespace of the `<c/>` element carried in presence (XEP-0115).
pub const NS_CAPS: &str = "http://jabber.org/protocol/caps";

/// Namespace of service discovery info queries (XEP-0030).
pub const NS_DISCO_INFO: &str = "http://jabber.org/protocol/disco#info";

/// Namespace of data forms (XEP-0004), used for extended disco info (XEP-0128).
pub const NS_DATA_FORMS: &str = "jabber:x:data";

/// Field name that identifies the type of an extended data form.
pub const FORM_TYPE: &str = "FORM_TYPE";

/// Terminator appended after every token of the verification string.
pub const TOKEN_SEPARATOR: char = '<';

/// Separator between the components of an identity token.
pub const IDENTITY_SEPARATOR: char = '/';

/// Prefix of capability cache keys in a string key/value store.
pub const CACHE_KEY_PREFIX: &str = "caps_";
