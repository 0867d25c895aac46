//! Inline formsets

use serde::Serialize;

use super::form::{FieldErrors, Form};
use crate::domain::record::{FieldValues, RecordId};

/// Message reported when the management fields are absent or malformed
pub const MANAGEMENT_FORM_ERROR: &str = "ManagementForm data is missing or has been tampered with";

/// Row bookkeeping submitted alongside the inline rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ManagementForm {
    pub total_forms: usize,
    pub initial_forms: usize,
    pub min_num_forms: usize,
    pub max_num_forms: usize,
}

impl ManagementForm {
    pub const TOTAL_FORMS: &'static str = "TOTAL_FORMS";
    pub const INITIAL_FORMS: &'static str = "INITIAL_FORMS";
    pub const MIN_NUM_FORMS: &'static str = "MIN_NUM_FORMS";
    pub const MAX_NUM_FORMS: &'static str = "MAX_NUM_FORMS";
}

/// One inline row: the child's form plus its identity and deletion flag
#[derive(Debug, Clone, Serialize)]
pub struct InlineRow {
    index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<RecordId>,
    /// Raw id submitted for the row, shown again when it was rejected
    #[serde(skip_serializing_if = "Option::is_none")]
    submitted_id: Option<String>,
    form: Form,
    #[serde(skip_serializing_if = "Option::is_none")]
    delete: Option<bool>,
    extra: bool,
}

impl InlineRow {
    /// Row for an existing child
    pub fn existing(index: usize, id: Option<RecordId>, form: Form) -> Self {
        Self {
            index,
            id,
            submitted_id: None,
            form,
            delete: None,
            extra: false,
        }
    }

    /// Blank row offered for a new child
    pub fn extra(index: usize, form: Form) -> Self {
        Self {
            index,
            id: None,
            submitted_id: None,
            form,
            delete: None,
            extra: true,
        }
    }

    /// Attach the deletion flag (builder pattern)
    pub fn with_delete(mut self, delete: bool) -> Self {
        self.delete = Some(delete);
        self
    }

    /// Keep the id value a bound row was submitted with (builder pattern)
    pub fn with_submitted_id(mut self, raw_id: impl Into<String>) -> Self {
        self.submitted_id = Some(raw_id.into());
        self
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Id of the existing child this row edits
    pub fn instance_id(&self) -> Option<RecordId> {
        self.id
    }

    pub fn submitted_id(&self) -> Option<&str> {
        self.submitted_id.as_deref()
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn is_extra(&self) -> bool {
        self.extra
    }

    pub fn is_marked_for_deletion(&self) -> bool {
        self.delete.unwrap_or(false)
    }
}

/// A row that must be written: an existing child to update or a new one to insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowChange {
    pub id: Option<RecordId>,
    pub values: FieldValues,
}

/// What a valid formset asks the record store to do
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSetChanges {
    pub saved: Vec<RowChange>,
    pub deleted: Vec<RecordId>,
}

/// An ordered collection of inline rows validated together
#[derive(Debug, Clone, Serialize)]
pub struct FormSet {
    prefix: String,
    is_bound: bool,
    can_delete: bool,
    management_form: ManagementForm,
    rows: Vec<InlineRow>,
    non_form_errors: Vec<String>,
}

impl FormSet {
    pub fn new(
        prefix: impl Into<String>,
        is_bound: bool,
        can_delete: bool,
        management_form: ManagementForm,
        rows: Vec<InlineRow>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            is_bound,
            can_delete,
            management_form,
            rows,
            non_form_errors: Vec::new(),
        }
    }

    /// Add an error concerning the whole set (builder pattern)
    pub fn with_non_form_error(mut self, message: impl Into<String>) -> Self {
        self.non_form_errors.push(message.into());
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn is_bound(&self) -> bool {
        self.is_bound
    }

    pub fn can_delete(&self) -> bool {
        self.can_delete
    }

    pub fn management_form(&self) -> &ManagementForm {
        &self.management_form
    }

    pub fn rows(&self) -> &[InlineRow] {
        &self.rows
    }

    /// Rows offered for new children
    pub fn extra_rows(&self) -> impl Iterator<Item = &InlineRow> {
        self.rows.iter().filter(|row| row.is_extra())
    }

    pub fn non_form_errors(&self) -> &[String] {
        &self.non_form_errors
    }

    /// Valid when bound, free of set-level errors and every row not flagged for
    /// deletion is valid
    pub fn is_valid(&self) -> bool {
        self.is_bound
            && self.non_form_errors.is_empty()
            && self
                .rows
                .iter()
                .filter(|row| !(self.can_delete && row.is_marked_for_deletion()))
                .all(|row| row.form.is_valid())
    }

    /// Errors of every row, in row order
    pub fn errors(&self) -> Vec<FieldErrors> {
        self.rows.iter().map(|row| row.form.errors().clone()).collect()
    }

    /// Writes requested by a valid formset; `None` when invalid
    ///
    /// Unchanged rows are skipped, new rows flagged for deletion are dropped and
    /// existing rows flagged for deletion are reported as deletions.
    pub fn changes(&self) -> Option<FormSetChanges> {
        if !self.is_valid() {
            return None;
        }

        let mut changes = FormSetChanges::default();

        for row in &self.rows {
            if self.can_delete && row.is_marked_for_deletion() {
                if let Some(id) = row.id {
                    changes.deleted.push(id);
                }
                continue;
            }

            if !row.form.has_changed() {
                continue;
            }

            if let Some(values) = row.form.cleaned_data() {
                changes.saved.push(RowChange {
                    id: row.id,
                    values: values.clone(),
                });
            }
        }

        Some(changes)
    }
}
