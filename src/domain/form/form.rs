//! Single record forms

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::record::FieldValues;

/// Field name → ordered error messages
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Key under which errors not tied to one field are reported
pub const NON_FIELD_ERRORS: &str = "__all__";

/// One field of a form as it is presented to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundField {
    pub name: String,
    /// Name of the input in submitted data, including any prefix
    pub html_name: String,
    pub label: String,
    /// Submitted value for bound forms, initial value otherwise
    pub value: String,
    pub required: bool,
}

/// A form for one record, either unbound (initial values) or bound to submitted data
#[derive(Debug, Clone, Serialize)]
pub struct Form {
    #[serde(skip_serializing_if = "Option::is_none")]
    prefix: Option<String>,
    is_bound: bool,
    fields: Vec<BoundField>,
    errors: FieldErrors,
    #[serde(skip)]
    cleaned: Option<FieldValues>,
    #[serde(skip)]
    changed: bool,
}

impl Form {
    /// Form showing initial values
    pub fn unbound(prefix: Option<String>, fields: Vec<BoundField>) -> Self {
        Self {
            prefix,
            is_bound: false,
            fields,
            errors: FieldErrors::new(),
            cleaned: None,
            changed: false,
        }
    }

    /// Form bound to submitted data
    ///
    /// `cleaned` is discarded when any error is present.
    pub fn bound(
        prefix: Option<String>,
        fields: Vec<BoundField>,
        errors: FieldErrors,
        cleaned: FieldValues,
        changed: bool,
    ) -> Self {
        let errors: FieldErrors = errors
            .into_iter()
            .filter(|(_, messages)| !messages.is_empty())
            .collect();
        let cleaned = errors.is_empty().then_some(cleaned);

        Self {
            prefix,
            is_bound: true,
            fields,
            errors,
            cleaned,
            changed,
        }
    }

    /// Record an error found outside field cleaning; the form becomes invalid
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
        self.cleaned = None;
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn is_bound(&self) -> bool {
        self.is_bound
    }

    pub fn is_valid(&self) -> bool {
        self.is_bound && self.cleaned.is_some()
    }

    pub fn fields(&self) -> &[BoundField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&BoundField> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Display value of a field
    pub fn value(&self, name: &str) -> Option<&str> {
        self.field(name).map(|field| field.value.as_str())
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn field_errors(&self, name: &str) -> &[String] {
        self.errors.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn non_field_errors(&self) -> &[String] {
        self.field_errors(NON_FIELD_ERRORS)
    }

    /// Cleaned values, present only for valid bound forms
    pub fn cleaned_data(&self) -> Option<&FieldValues> {
        self.cleaned.as_ref()
    }

    /// Whether submitted data differs from the initial values
    pub fn has_changed(&self) -> bool {
        self.changed
    }
}
