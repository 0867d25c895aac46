//! Form domain - the form validator contract
//!
//! A form edits the configured fields of one record; a formset edits an ordered
//! collection of child records, each row naming its fields `<prefix>-<index>-<field>`
//! next to the management fields that tell how many rows were submitted.

mod data;
mod form;
mod formset;
mod spec;
mod validator;

pub use data::{prefixed, FormData};
pub use form::{BoundField, FieldErrors, Form, NON_FIELD_ERRORS};
pub use formset::{
    FormSet, FormSetChanges, InlineRow, ManagementForm, RowChange, MANAGEMENT_FORM_ERROR,
};
pub use spec::{FormSetSpec, FormSpec, DEFAULT_MAX_NUM};
pub use validator::{
    BlankExtraRowPolicy, ExistingRecord, FormValidator, SchemaFormValidator, DELETION_FIELD,
    INVALID_CHOICE_ERROR, INVALID_INTEGER_ERROR, REQUIRED_ERROR,
};
