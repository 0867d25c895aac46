//! Inline workflow - one main record edited together with its child records

mod config;
mod context;
mod create;
mod engine;
mod outcome;
mod success_url;
mod update;
mod variant;

pub use config::{resolve_relation, validate_fields, WorkflowConfig};
pub use context::{RequestContext, RequestMethod};
pub use create::{CreateVariant, CREATE_FORMSET_PREFIX};
pub use engine::InlineWorkflow;
pub use outcome::{
    FormContext, InlineChanges, RenderedForm, SavedRecords, ValidationOutcome, WorkflowResponse,
};
pub use success_url::SuccessUrl;
pub use update::UpdateVariant;
pub use variant::{InlineFormSpecs, VariantKind, WorkflowVariant};
