//! Results produced by a workflow

use serde::Serialize;

use crate::domain::form::{FieldErrors, Form, FormSet};
use crate::domain::record::{Entity, FieldValues, RecordId};

/// Inline records a valid submission asks to write
#[derive(Debug, Clone)]
pub struct InlineChanges<I: Entity> {
    /// New children (no id) and changed existing children, in row order
    pub saved: Vec<I>,
    /// Existing children flagged for deletion
    pub deleted: Vec<RecordId>,
}

impl<I: Entity> Default for InlineChanges<I> {
    fn default() -> Self {
        Self {
            saved: Vec::new(),
            deleted: Vec::new(),
        }
    }
}

/// Result of validating the main form and the formset together
#[derive(Debug, Clone)]
pub enum ValidationOutcome<M: Entity, I: Entity> {
    Valid {
        main: M,
        inline: InlineChanges<I>,
    },
    Invalid {
        main_errors: FieldErrors,
        inline_errors: Vec<FieldErrors>,
        non_form_errors: Vec<String>,
    },
}

impl<M: Entity, I: Entity> ValidationOutcome<M, I> {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }
}

/// Records written by a successful submission
#[derive(Debug, Clone)]
pub struct SavedRecords<M: Entity, I: Entity> {
    pub main: M,
    pub inline: Vec<I>,
    pub deleted: usize,
}

/// Everything a template needs to present the forms
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormContext {
    pub main_form: Form,
    pub inline_forms: FormSet,
    /// Values of the record being edited
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<FieldValues>,
}

/// A context paired with the template that presents it
#[derive(Debug, Clone)]
pub struct RenderedForm {
    pub template: String,
    pub context: FormContext,
}

#[derive(Debug, Clone)]
pub enum WorkflowResponse {
    Render(RenderedForm),
    Redirect(String),
}

impl WorkflowResponse {
    pub fn redirect_location(&self) -> Option<&str> {
        match self {
            Self::Redirect(location) => Some(location),
            Self::Render(_) => None,
        }
    }
}
