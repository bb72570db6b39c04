//! Service discovery identity.

use std::fmt;

use crate::constants::IDENTITY_SEPARATOR;

/// An identity advertised in a disco#info reply.
///
/// Every component may be empty; a reply that omits an attribute yields an
/// empty string rather than an error. Identities are not deduplicated.
///
/// # Examples
///
/// ```
/// use entity_caps::Identity;
///
/// let identity = Identity::new("client", "web").with_name("Jappix");
/// assert_eq!(identity.token(), "client/web//Jappix");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Identity {
    /// Identity category (e.g. `client`, `server`, `pubsub`)
    #[cfg_attr(feature = "serde", serde(default))]
    pub category: String,
    /// Identity type within the category (e.g. `pc`, `web`, `pep`)
    #[cfg_attr(feature = "serde", serde(rename = "type", default))]
    pub kind: String,
    /// Value of the `xml:lang` attribute
    #[cfg_attr(feature = "serde", serde(default))]
    pub lang: String,
    /// Human readable name
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
}

impl Identity {
    /// Creates an identity with the given category and type, no language
    /// and no name.
    #[must_use]
    pub fn new(category: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            kind: kind.into(),
            lang: String::new(),
            name: String::new(),
        }
    }

    /// Sets the `xml:lang` value.
    #[must_use]
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    /// Sets the human readable name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns true if this identity has the given category and type.
    #[must_use]
    pub fn is(&self, category: &str, kind: &str) -> bool {
        self.category == category && self.kind == kind
    }

    /// Returns the `category/type/lang/name` token used for sorting and
    /// hashing.
    #[must_use]
    pub fn token(&self) -> String {
        let mut token = String::with_capacity(
            self.category.len() + self.kind.len() + self.lang.len() + self.name.len() + 3,
        );
        token.push_str(&self.category);
        token.push(IDENTITY_SEPARATOR);
        token.push_str(&self.kind);
        token.push(IDENTITY_SEPARATOR);
        token.push_str(&self.lang);
        token.push(IDENTITY_SEPARATOR);
        token.push_str(&self.name);
        token
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token())
    }
}
