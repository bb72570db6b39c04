//! Typed disco#info reply.

use crate::canonical::canonicalize;
use crate::form::DataForm;
use crate::hash::{CapsHash, HashAlgorithm};
use crate::identity::Identity;

/// The parsed content of a disco#info reply.
///
/// This is the shape the transport hands back after parsing a reply; nothing
/// downstream inspects raw stanzas. Elements missing from the reply are
/// represented as empty collections.
///
/// # Examples
///
/// ```
/// use entity_caps::{DiscoInfo, HashAlgorithm, Identity};
///
/// let info = DiscoInfo::new()
///     .with_identity(Identity::new("client", "web").with_name("Jappix"))
///     .with_feature("urn:xmpp:ping");
///
/// assert!(info.has_feature("urn:xmpp:ping"));
/// assert_eq!(info.canonical_string(), "client/web//Jappix<urn:xmpp:ping<");
/// assert_eq!(
///     info.verification_hash(HashAlgorithm::Sha1).as_str(),
///     "KbjoKEv4QbJOdAIvOZg+6mxiLRo="
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiscoInfo {
    /// Node the reply was issued for, if the query named one
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub node: Option<String>,
    /// Advertised identities
    #[cfg_attr(feature = "serde", serde(default))]
    pub identities: Vec<Identity>,
    /// Advertised feature namespaces
    #[cfg_attr(feature = "serde", serde(default))]
    pub features: Vec<String>,
    /// Extended information forms
    #[cfg_attr(feature = "serde", serde(default))]
    pub forms: Vec<DataForm>,
}

impl DiscoInfo {
    /// Creates an empty reply.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the node.
    #[must_use]
    pub fn with_node(mut self, node: impl Into<String>) -> Self {
        self.node = Some(node.into());
        self
    }

    /// Appends an identity.
    #[must_use]
    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identities.push(identity);
        self
    }

    /// Appends a feature namespace.
    #[must_use]
    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.features.push(feature.into());
        self
    }

    /// Appends several feature namespaces.
    #[must_use]
    pub fn with_features<I, F>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        self.features.extend(features.into_iter().map(Into::into));
        self
    }

    /// Appends an extended data form.
    #[must_use]
    pub fn with_form(mut self, form: DataForm) -> Self {
        self.forms.push(form);
        self
    }

    /// Returns true if the reply lists the feature namespace exactly.
    #[must_use]
    pub fn has_feature(&self, namespace: &str) -> bool {
        self.features.iter().any(|f| f == namespace)
    }

    /// Returns true if the reply has an identity with this category and type.
    #[must_use]
    pub fn has_identity(&self, category: &str, kind: &str) -> bool {
        self.identities.iter().any(|i| i.is(category, kind))
    }

    /// Returns the form whose `FORM_TYPE` is `form_type`.
    #[must_use]
    pub fn form(&self, form_type: &str) -> Option<&DataForm> {
        self.forms.iter().find(|f| f.form_type() == Some(form_type))
    }

    /// Returns true if the reply carries no identities, features or forms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.identities.is_empty() && self.features.is_empty() && self.forms.is_empty()
    }

    /// Returns the verification string for this capability set.
    #[must_use]
    pub fn canonical_string(&self) -> String {
        canonicalize(&self.identities, &self.features, &self.forms)
    }

    /// Computes the capability hash of this reply.
    #[must_use]
    pub fn verification_hash(&self, algorithm: HashAlgorithm) -> CapsHash {
        algorithm.digest(&self.canonical_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{NS_CAPS, NS_DISCO_INFO};
    use crate::form::FormField;

    fn exodus() -> DiscoInfo {
        DiscoInfo::new()
            .with_identity(Identity::new("client", "pc").with_name("Exodus 0.9.1"))
            .with_features([
                "http://jabber.org/protocol/muc",
                NS_DISCO_INFO,
                "http://jabber.org/protocol/disco#items",
                NS_CAPS,
            ])
    }

    #[test]
    fn simple_generation_example() {
        let info = exodus();
        assert_eq!(
            info.canonical_string(),
            "client/pc//Exodus 0.9.1<http://jabber.org/protocol/caps<\
             http://jabber.org/protocol/disco#info<http://jabber.org/protocol/disco#items<\
             http://jabber.org/protocol/muc<"
        );
        assert_eq!(
            info.verification_hash(HashAlgorithm::Sha1).as_str(),
            "QgayPKawpkPSDYmwT/WM94uAlu0="
        );
    }

    #[test]
    fn complex_generation_example() {
        let info = DiscoInfo::new()
            .with_identity(Identity::new("client", "pc").with_lang("en").with_name("Psi 0.11"))
            .with_features([
                NS_CAPS,
                NS_DISCO_INFO,
                "http://jabber.org/protocol/disco#items",
                "http://jabber.org/protocol/muc",
            ])
            .with_identity(Identity::new("client", "pc").with_lang("el").with_name("Ψ 0.11"))
            .with_form(
                DataForm::new()
                    .with_field(FormField::new("FORM_TYPE", ["urn:xmpp:dataforms:softwareinfo"]))
                    .with_field(FormField::new("ip_version", ["ipv4", "ipv6"]))
                    .with_field(FormField::new("os", ["Mac"]))
                    .with_field(FormField::new("os_version", ["10.5.1"]))
                    .with_field(FormField::new("software", ["Psi"]))
                    .with_field(FormField::new("software_version", ["0.11"])),
            );
        // Language tags sort "el" before "en".
        assert_eq!(
            info.canonical_string(),
            "client/pc/el/Ψ 0.11<client/pc/en/Psi 0.11<http://jabber.org/protocol/caps<\
             http://jabber.org/protocol/disco#info<http://jabber.org/protocol/disco#items<\
             http://jabber.org/protocol/muc<urn:xmpp:dataforms:softwareinfo<\
             ip_version<ipv4<ipv6<os<Mac<os_version<10.5.1<software<Psi<software_version<0.11<"
        );
        assert_eq!(
            info.verification_hash(HashAlgorithm::Sha1).as_str(),
            "Q07IKJEyjvHSyhy//CH0CxmKi8w="
        );
    }

    #[test]
    fn has_feature_requires_exact_match() {
        let info = DiscoInfo::new().with_feature("http://jabber.org/protocol/pubsub#publish");
        assert!(!info.has_feature("http://jabber.org/protocol/pubsub"));
        assert!(info.has_feature("http://jabber.org/protocol/pubsub#publish"));
    }

    #[test]
    fn has_identity() {
        let info = DiscoInfo::new().with_identity(Identity::new("pubsub", "pep"));
        assert!(info.has_identity("pubsub", "pep"));
        assert!(!info.has_identity("server", "im"));
    }

    #[test]
    fn empty_reply_hashes_empty_string() {
        let info = DiscoInfo::new();
        assert!(info.is_empty());
        assert_eq!(
            info.verification_hash(HashAlgorithm::Sha1).as_str(),
            "2jmj7l5rSw0yVb/vlWAYkK/YBwk="
        );
    }

    #[test]
    fn node_does_not_affect_hash() {
        let with_node = exodus().with_node("http://code.google.com/p/exodus#QgayPKawpkPSDYmwT/WM94uAlu0=");
        assert_eq!(
            with_node.verification_hash(HashAlgorithm::Sha1),
            exodus().verification_hash(HashAlgorithm::Sha1)
        );
    }

    #[test]
    fn form_lookup_by_type() {
        let info = DiscoInfo::new().with_form(
            DataForm::new().with_field(FormField::new("FORM_TYPE", ["urn:xmpp:dataforms:softwareinfo"])),
        );
        assert!(info.form("urn:xmpp:dataforms:softwareinfo").is_some());
        assert!(info.form("urn:example").is_none());
    }
}
