//! Extended service discovery data forms (XEP-0128).

use crate::constants::{FORM_TYPE, TOKEN_SEPARATOR};

/// A single field of an extended data form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FormField {
    /// Field name (`var` attribute)
    #[cfg_attr(feature = "serde", serde(default))]
    pub var: String,
    /// Field values in document order
    #[cfg_attr(feature = "serde", serde(default))]
    pub values: Vec<String>,
}

impl FormField {
    /// Creates a field with the given values.
    #[must_use]
    pub fn new<I, V>(var: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self {
            var: var.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if this is the `FORM_TYPE` field.
    #[must_use]
    pub fn is_form_type(&self) -> bool {
        self.var == FORM_TYPE
    }

    /// Serializes as `var<` followed by each sorted value and `<`.
    fn canonical_fragment(&self) -> String {
        let mut values: Vec<&str> = self.values.iter().map(String::as_str).collect();
        values.sort_unstable();

        let mut out = String::new();
        out.push_str(&self.var);
        out.push(TOKEN_SEPARATOR);
        for value in values {
            out.push_str(value);
            out.push(TOKEN_SEPARATOR);
        }
        out
    }
}

/// An extended data form attached to a disco#info reply.
///
/// # Examples
///
/// ```
/// use entity_caps::{DataForm, FormField};
///
/// let form = DataForm::new()
///     .with_field(FormField::new("FORM_TYPE", ["urn:xmpp:dataforms:softwareinfo"]))
///     .with_field(FormField::new("os", ["Mac"]));
///
/// assert_eq!(form.form_type(), Some("urn:xmpp:dataforms:softwareinfo"));
/// assert_eq!(form.canonical_string(), "urn:xmpp:dataforms:softwareinfo<os<Mac<");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataForm {
    /// Fields in document order
    #[cfg_attr(feature = "serde", serde(default))]
    pub fields: Vec<FormField>,
}

impl DataForm {
    /// Creates an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field.
    #[must_use]
    pub fn with_field(mut self, field: FormField) -> Self {
        self.fields.push(field);
        self
    }

    /// Returns the first `FORM_TYPE` value, if the form has one.
    #[must_use]
    pub fn form_type(&self) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.is_form_type())
            .and_then(|f| f.values.first())
            .map(String::as_str)
    }

    /// Returns the field with the given name.
    #[must_use]
    pub fn field(&self, var: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.var == var)
    }

    /// Serializes this form into its verification sub-string.
    ///
    /// `FORM_TYPE` values come first, unsorted relative to other fields.
    /// The remaining fields follow sorted by `var`, each with its values
    /// sorted. A trailing run of separators is collapsed to one.
    #[must_use]
    pub fn canonical_string(&self) -> String {
        let mut out = String::new();

        for field in self.fields.iter().filter(|f| f.is_form_type()) {
            for value in &field.values {
                out.push_str(value);
                out.push(TOKEN_SEPARATOR);
            }
        }

        // Ties on `var` fall back to the full fragment so duplicate field
        // names still serialize independently of document order.
        let mut others: Vec<(&str, String)> = self
            .fields
            .iter()
            .filter(|f| !f.is_form_type())
            .map(|f| (f.var.as_str(), f.canonical_fragment()))
            .collect();
        others.sort_unstable();

        for (_, fragment) in others {
            out.push_str(&fragment);
        }

        collapse_trailing_separators(&mut out);
        out
    }
}

fn collapse_trailing_separators(s: &mut String) {
    while s.ends_with(TOKEN_SEPARATOR) && s[..s.len() - 1].ends_with(TOKEN_SEPARATOR) {
        s.pop();
    }
}
