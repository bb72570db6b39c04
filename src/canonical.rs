//! Verification string construction.
//!
//! Both ends of a capability exchange compute this string independently, so
//! the byte layout is fixed:
//!
//! ```text
//! S = identity<... feature<... form...
//! identity = category/type/lang/name
//! ```
//!
//! Identities, features and form sub-strings are each sorted as plain
//! strings before concatenation.

use crate::constants::TOKEN_SEPARATOR;
use crate::form::DataForm;
use crate::identity::Identity;

/// Builds the verification string for a capability set.
///
/// The result is independent of the input order of identities, features,
/// forms and form fields.
///
/// # Examples
///
/// ```
/// use entity_caps::{canonicalize, Identity};
///
/// let identities = [Identity::new("client", "web").with_name("Jappix")];
/// let features = ["urn:xmpp:ping".to_string()];
///
/// assert_eq!(
///     canonicalize(&identities, &features, &[]),
///     "client/web//Jappix<urn:xmpp:ping<"
/// );
/// ```
#[must_use]
pub fn canonicalize(identities: &[Identity], features: &[String], forms: &[DataForm]) -> String {
    let mut identity_tokens: Vec<String> = identities.iter().map(Identity::token).collect();
    identity_tokens.sort_unstable();

    let mut feature_tokens: Vec<&str> = features.iter().map(String::as_str).collect();
    feature_tokens.sort_unstable();

    let mut form_tokens: Vec<String> = forms.iter().map(DataForm::canonical_string).collect();
    form_tokens.sort_unstable();

    let mut out = String::new();
    for token in &identity_tokens {
        out.push_str(token);
        out.push(TOKEN_SEPARATOR);
    }
    for token in feature_tokens {
        out.push_str(token);
        out.push(TOKEN_SEPARATOR);
    }
    // Form sub-strings carry their own separators.
    for token in &form_tokens {
        out.push_str(token);
    }
    out
}
