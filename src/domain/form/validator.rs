//! Form validator contract and the schema-driven default implementation

use std::fmt::Debug;

use serde::Deserialize;
use validator::ValidateLength;

use super::data::{prefixed, FormData};
use super::form::{BoundField, FieldErrors, Form};
use super::formset::{FormSet, InlineRow, ManagementForm, MANAGEMENT_FORM_ERROR};
use super::spec::{FormSetSpec, FormSpec};
use crate::domain::record::{EntitySchema, FieldDef, FieldKind, FieldValue, FieldValues, RecordId};

pub const REQUIRED_ERROR: &str = "This field is required.";
pub const INVALID_INTEGER_ERROR: &str = "Enter a whole number.";
pub const INVALID_CHOICE_ERROR: &str =
    "Select a valid choice. That choice is not one of the available choices.";

/// Name of the per-row deletion flag
pub const DELETION_FIELD: &str = "DELETE";

/// How blank extra rows of a bound formset are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlankExtraRowPolicy {
    /// Extra rows left untouched are valid and contribute nothing
    #[default]
    Skip,
    /// Every extra row is validated like any other row
    Validate,
}

/// An existing child offered to a formset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingRecord {
    pub id: RecordId,
    pub values: FieldValues,
}

/// Builds forms and formsets and validates submitted data against them
pub trait FormValidator: Send + Sync + Debug {
    /// Build a form, bound when `data` is given, showing `instance` values otherwise
    fn build_form(
        &self,
        spec: &FormSpec,
        data: Option<&FormData>,
        instance: Option<&FieldValues>,
    ) -> Form;

    /// Build a formset over the `existing` children plus the configured extra rows
    fn build_form_set(
        &self,
        spec: &FormSetSpec,
        data: Option<&FormData>,
        existing: &[ExistingRecord],
    ) -> FormSet;
}

/// Validator deriving field rules from entity schemas
#[derive(Debug, Clone, Default)]
pub struct SchemaFormValidator {
    blank_extra_rows: BlankExtraRowPolicy,
}

impl SchemaFormValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blank_extra_rows(mut self, policy: BlankExtraRowPolicy) -> Self {
        self.blank_extra_rows = policy;
        self
    }

    pub fn blank_extra_rows(&self) -> BlankExtraRowPolicy {
        self.blank_extra_rows
    }

    fn unbound(&self, spec: &FormSpec, prefix: Option<String>, initial: &FieldValues) -> Form {
        let fields = spec
            .field_defs()
            .map(|def| bound_field(def, prefix.as_deref(), display(initial, def.name)))
            .collect();

        Form::unbound(prefix, fields)
    }

    fn bound(
        &self,
        spec: &FormSpec,
        prefix: Option<String>,
        data: &FormData,
        initial: &FieldValues,
        empty_permitted: bool,
    ) -> Form {
        let raw: Vec<(&FieldDef, &str)> = spec
            .field_defs()
            .map(|def| {
                let name = prefixed(prefix.as_deref(), def.name);
                (def, data.get(&name).unwrap_or(""))
            })
            .collect();

        let changed = raw
            .iter()
            .any(|(def, value)| value.trim() != display(initial, def.name));
        let fields = raw
            .iter()
            .map(|(def, value)| bound_field(def, prefix.as_deref(), value.to_string()))
            .collect();

        if empty_permitted && !changed {
            return Form::bound(prefix, fields, FieldErrors::new(), FieldValues::new(), false);
        }

        let mut errors = FieldErrors::new();
        let mut cleaned = FieldValues::new();

        for (def, value) in raw {
            match clean_field(def, value) {
                Ok(value) => {
                    cleaned.insert(def.name.to_string(), value);
                }
                Err(message) => errors.entry(def.name.to_string()).or_default().push(message),
            }
        }

        Form::bound(prefix, fields, errors, cleaned, changed)
    }

    fn bound_form_set(
        &self,
        spec: &FormSetSpec,
        data: &FormData,
        existing: &[ExistingRecord],
    ) -> FormSet {
        let prefix = Some(spec.prefix.as_str());
        let count = |key: &str| parse_count(data.get(&prefixed(prefix, key)));

        let (total, initial) = match (
            count(ManagementForm::TOTAL_FORMS),
            count(ManagementForm::INITIAL_FORMS),
        ) {
            (Some(total), Some(initial)) => (total, initial),
            _ => {
                let management = ManagementForm {
                    total_forms: 0,
                    initial_forms: 0,
                    min_num_forms: 0,
                    max_num_forms: spec.max_num,
                };
                return FormSet::new(&spec.prefix, true, spec.can_delete, management, Vec::new())
                    .with_non_form_error(MANAGEMENT_FORM_ERROR);
            }
        };

        let management = ManagementForm {
            total_forms: total,
            initial_forms: initial,
            min_num_forms: count(ManagementForm::MIN_NUM_FORMS).unwrap_or(0),
            max_num_forms: count(ManagementForm::MAX_NUM_FORMS).unwrap_or(spec.max_num),
        };
        let total = total.min(spec.absolute_max());
        let initial = initial.min(total);
        let blank = initial_values(&spec.form, None);

        let rows = (0..total)
            .map(|index| {
                let row_prefix = spec.row_prefix(index);

                let row = if index < initial {
                    let raw_id = data.get(&prefixed(Some(&row_prefix), EntitySchema::ID_FIELD));
                    let (record, id_error) = resolve_existing(raw_id, existing);
                    let row_initial = match record {
                        Some(record) => initial_values(&spec.form, Some(&record.values)),
                        None => blank.clone(),
                    };

                    let mut form =
                        self.bound(&spec.form, Some(row_prefix.clone()), data, &row_initial, false);
                    if let Some(message) = id_error {
                        form.add_error(EntitySchema::ID_FIELD, message);
                    }
                    let row = InlineRow::existing(index, record.map(|r| r.id), form);
                    match raw_id {
                        Some(raw_id) => row.with_submitted_id(raw_id),
                        None => row,
                    }
                } else {
                    let empty_permitted = self.blank_extra_rows == BlankExtraRowPolicy::Skip;
                    let form =
                        self.bound(&spec.form, Some(row_prefix.clone()), data, &blank, empty_permitted);
                    InlineRow::extra(index, form)
                };

                if spec.can_delete {
                    let flag = data.get(&prefixed(Some(&row_prefix), DELETION_FIELD));
                    row.with_delete(checkbox(flag))
                } else {
                    row
                }
            })
            .collect();

        FormSet::new(&spec.prefix, true, spec.can_delete, management, rows)
    }

    fn unbound_form_set(&self, spec: &FormSetSpec, existing: &[ExistingRecord]) -> FormSet {
        let blank = initial_values(&spec.form, None);

        let existing_rows = existing.iter().enumerate().map(|(index, record)| {
            let initial = initial_values(&spec.form, Some(&record.values));
            let form = self.unbound(&spec.form, Some(spec.row_prefix(index)), &initial);
            InlineRow::existing(index, Some(record.id), form)
        });
        // At most max_num rows, unless more children already exist
        let total = (existing.len() + spec.extra).min(spec.max_num.max(existing.len()));
        let extra_rows = (existing.len()..total).map(|index| {
            let form = self.unbound(&spec.form, Some(spec.row_prefix(index)), &blank);
            InlineRow::extra(index, form)
        });

        let rows = existing_rows
            .chain(extra_rows)
            .map(|row| if spec.can_delete { row.with_delete(false) } else { row })
            .collect::<Vec<_>>();

        let management = ManagementForm {
            total_forms: rows.len(),
            initial_forms: existing.len(),
            min_num_forms: 0,
            max_num_forms: spec.max_num,
        };

        FormSet::new(&spec.prefix, false, spec.can_delete, management, rows)
    }
}

impl FormValidator for SchemaFormValidator {
    fn build_form(
        &self,
        spec: &FormSpec,
        data: Option<&FormData>,
        instance: Option<&FieldValues>,
    ) -> Form {
        let initial = initial_values(spec, instance);

        match data {
            Some(data) => self.bound(spec, spec.prefix.clone(), data, &initial, false),
            None => self.unbound(spec, spec.prefix.clone(), &initial),
        }
    }

    fn build_form_set(
        &self,
        spec: &FormSetSpec,
        data: Option<&FormData>,
        existing: &[ExistingRecord],
    ) -> FormSet {
        match data {
            Some(data) => self.bound_form_set(spec, data, existing),
            None => self.unbound_form_set(spec, existing),
        }
    }
}

/// Instance values for the form's fields, overridden by configured initial values
fn initial_values(spec: &FormSpec, instance: Option<&FieldValues>) -> FieldValues {
    let mut values: FieldValues = instance
        .into_iter()
        .flatten()
        .filter(|(name, _)| spec.fields.iter().any(|field| field == *name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    for (name, value) in &spec.initial {
        values.insert(name.clone(), value.clone());
    }

    values
}

fn display(values: &FieldValues, name: &str) -> String {
    values.get(name).map(ToString::to_string).unwrap_or_default()
}

fn bound_field(def: &FieldDef, prefix: Option<&str>, value: String) -> BoundField {
    BoundField {
        name: def.name.to_string(),
        html_name: prefixed(prefix, def.name),
        label: def.label.to_string(),
        value,
        required: def.required,
    }
}

/// Clean one raw submitted value according to its field definition
fn clean_field(def: &FieldDef, raw: &str) -> Result<FieldValue, String> {
    let value = raw.trim();

    if value.is_empty() {
        return match (def.required, def.kind) {
            (true, _) => Err(REQUIRED_ERROR.to_string()),
            (false, FieldKind::Char { .. }) => Ok(FieldValue::text("")),
            (false, _) => Ok(FieldValue::Null),
        };
    }

    match def.kind {
        FieldKind::Char { max_length } => {
            let value = value.to_string();
            if !value.validate_length(None, Some(max_length as u64), None) {
                return Err(format!(
                    "Ensure this value has at most {} characters (it has {}).",
                    max_length,
                    value.chars().count()
                ));
            }
            Ok(FieldValue::Text(value))
        }
        FieldKind::Integer => value
            .parse::<i64>()
            .map(FieldValue::Integer)
            .map_err(|_| INVALID_INTEGER_ERROR.to_string()),
        FieldKind::ForeignKey { .. } => value
            .parse::<RecordId>()
            .map(FieldValue::from)
            .map_err(|_| INVALID_CHOICE_ERROR.to_string()),
    }
}

/// Match a submitted row id against the existing children
fn resolve_existing<'a>(
    raw_id: Option<&str>,
    existing: &'a [ExistingRecord],
) -> (Option<&'a ExistingRecord>, Option<&'static str>) {
    let raw_id = match raw_id.map(str::trim).filter(|id| !id.is_empty()) {
        Some(raw_id) => raw_id,
        None => return (None, Some(REQUIRED_ERROR)),
    };

    let record = raw_id
        .parse::<RecordId>()
        .ok()
        .and_then(|id| existing.iter().find(|record| record.id == id));

    match record {
        Some(record) => (Some(record), None),
        None => (None, Some(INVALID_CHOICE_ERROR)),
    }
}

fn parse_count(raw: Option<&str>) -> Option<usize> {
    raw.and_then(|value| value.trim().parse::<usize>().ok())
}

/// Checkbox semantics: absent, empty, `false`, `False` and `0` are unchecked
fn checkbox(raw: Option<&str>) -> bool {
    !matches!(raw, None | Some("") | Some("false") | Some("False") | Some("0"))
}
