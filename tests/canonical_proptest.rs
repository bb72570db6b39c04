//! Property-based tests for verification string construction.
//!
//! Generated capability sets are shuffled and re-hashed to check that the
//! hash depends only on content, never on the order a reply lists it in.

use proptest::prelude::*;

use entity_caps::{DataForm, DiscoInfo, FormField, HashAlgorithm, Identity, canonicalize};

mod strategies {
    use super::*;

    /// Short tokens drawn from characters that appear in real namespaces,
    /// including the separators themselves.
    pub fn token() -> impl Strategy<Value = String> {
        "[a-z0-9:/#.<-]{0,12}"
    }

    pub fn namespace() -> impl Strategy<Value = String> {
        "(urn:xmpp|http://jabber\\.org/protocol)/[a-z]{1,10}"
    }

    pub fn identity() -> impl Strategy<Value = Identity> {
        (token(), token(), "[a-z]{0,2}", token()).prop_map(|(category, kind, lang, name)| Identity {
            category,
            kind,
            lang,
            name,
        })
    }

    pub fn field() -> impl Strategy<Value = FormField> {
        ("[a-z_]{1,10}", prop::collection::vec(token(), 0..4))
            .prop_map(|(var, values)| FormField { var, values })
    }

    pub fn form() -> impl Strategy<Value = DataForm> {
        (namespace(), prop::collection::vec(field(), 0..5)).prop_map(|(form_type, mut fields)| {
            fields.push(FormField::new("FORM_TYPE", [form_type]));
            DataForm { fields }
        })
    }

    pub fn disco_info() -> impl Strategy<Value = DiscoInfo> {
        (
            prop::collection::vec(identity(), 0..4),
            prop::collection::vec(namespace(), 0..8),
            prop::collection::vec(form(), 0..3),
        )
            .prop_map(|(identities, features, forms)| DiscoInfo {
                node: None,
                identities,
                features,
                forms,
            })
    }
}

/// Reorders every list in the reply, including each form's fields and each
/// field's values, using `seed` to pick the rotation.
fn permute(info: &DiscoInfo, seed: usize) -> DiscoInfo {
    fn rotate<T: Clone>(items: &[T], seed: usize) -> Vec<T> {
        let mut out = items.to_vec();
        if !out.is_empty() {
            let len = out.len();
            out.rotate_left(seed % len);
            if seed % 2 == 1 {
                out.reverse();
            }
        }
        out
    }

    DiscoInfo {
        node: info.node.clone(),
        identities: rotate(&info.identities, seed),
        features: rotate(&info.features, seed + 1),
        forms: rotate(&info.forms, seed + 2)
            .into_iter()
            .map(|form| DataForm {
                fields: rotate(&form.fields, seed + 3)
                    .into_iter()
                    .map(|field| FormField {
                        values: rotate(&field.values, seed + 5),
                        var: field.var,
                    })
                    .collect(),
            })
            .collect(),
    }
}

proptest! {
    #[test]
    fn canonical_string_is_order_independent(
        info in strategies::disco_info(),
        seed in 0usize..64,
    ) {
        let shuffled = permute(&info, seed);
        prop_assert_eq!(shuffled.canonical_string(), info.canonical_string());
    }

    #[test]
    fn hash_is_order_independent(
        info in strategies::disco_info(),
        seed in 0usize..64,
    ) {
        let shuffled = permute(&info, seed);
        prop_assert_eq!(
            shuffled.verification_hash(HashAlgorithm::Sha1),
            info.verification_hash(HashAlgorithm::Sha1)
        );
    }

    #[test]
    fn adding_a_feature_changes_the_hash(
        info in strategies::disco_info(),
        extra in "urn:example:[a-z]{1,8}",
    ) {
        let extended = info.clone().with_feature(extra);
        prop_assert_ne!(
            extended.verification_hash(HashAlgorithm::Sha1),
            info.verification_hash(HashAlgorithm::Sha1)
        );
    }

    #[test]
    fn adding_an_identity_changes_the_hash(
        info in strategies::disco_info(),
        identity in strategies::identity(),
    ) {
        let extended = info.clone().with_identity(identity);
        prop_assert_ne!(
            extended.verification_hash(HashAlgorithm::Sha256),
            info.verification_hash(HashAlgorithm::Sha256)
        );
    }

    #[test]
    fn canonicalize_matches_disco_info(info in strategies::disco_info()) {
        prop_assert_eq!(
            canonicalize(&info.identities, &info.features, &info.forms),
            info.canonical_string()
        );
    }

    #[test]
    fn every_feature_is_terminated(features in prop::collection::vec(strategies::namespace(), 1..10)) {
        let s = canonicalize(&[], &features, &[]);
        prop_assert_eq!(s.matches('<').count(), features.len());
        prop_assert!(s.ends_with('<'));
    }
}

#[test]
fn distinct_fixtures_hash_distinctly() {
    let fixtures = [
        DiscoInfo::new(),
        DiscoInfo::new().with_feature("urn:xmpp:ping"),
        DiscoInfo::new().with_feature("urn:xmpp:receipts"),
        DiscoInfo::new().with_features(["urn:xmpp:ping", "urn:xmpp:receipts"]),
        DiscoInfo::new().with_identity(Identity::new("client", "web")),
        DiscoInfo::new().with_identity(Identity::new("client", "pc")),
        DiscoInfo::new().with_identity(Identity::new("client", "web").with_lang("en")),
        DiscoInfo::new().with_identity(Identity::new("client", "web").with_name("Jappix")),
        DiscoInfo::new().with_form(
            DataForm::new().with_field(FormField::new("FORM_TYPE", ["urn:xmpp:dataforms:softwareinfo"])),
        ),
        DiscoInfo::new().with_form(
            DataForm::new()
                .with_field(FormField::new("FORM_TYPE", ["urn:xmpp:dataforms:softwareinfo"]))
                .with_field(FormField::new("os", ["Linux"])),
        ),
        DiscoInfo::new().with_form(
            DataForm::new()
                .with_field(FormField::new("FORM_TYPE", ["urn:xmpp:dataforms:softwareinfo"]))
                .with_field(FormField::new("os", ["Mac"])),
        ),
    ];

    let mut hashes: Vec<_> = fixtures
        .iter()
        .map(|f| f.verification_hash(HashAlgorithm::Sha1))
        .collect();
    hashes.sort();
    hashes.dedup();
    assert_eq!(hashes.len(), fixtures.len());
}
