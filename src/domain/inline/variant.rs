//! The hooks a workflow variant supplies to the engine

use std::fmt::{self, Debug};

use async_trait::async_trait;

use super::context::RequestContext;
use super::outcome::{InlineChanges, SavedRecords};
use crate::domain::form::{FormSetSpec, FormSpec};
use crate::domain::record::{Entity, RelationDef};
use crate::domain::DomainError;

/// Which variant a workflow runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantKind {
    Create,
    Update,
}

impl VariantKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
        }
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Formset spec plus the existing children it edits
#[derive(Debug, Clone)]
pub struct InlineFormSpecs<I: Entity> {
    pub formset: FormSetSpec,
    pub existing: Vec<I>,
}

/// Variant behaviour plugged into the shared request pipeline
#[async_trait]
pub trait WorkflowVariant<M, I>: Send + Sync + Debug
where
    M: Entity,
    I: Entity,
{
    fn kind(&self) -> VariantKind;

    /// Relation linking the main record to its children
    fn relation(&self) -> &'static RelationDef;

    /// The record shown and edited by the main form; `None` for a new record
    async fn resolve_initial_main(&self, request: &RequestContext) -> Result<Option<M>, DomainError>;

    fn build_main_form_spec(&self) -> FormSpec;

    async fn build_inline_form_specs(&self, main: Option<&M>) -> Result<InlineFormSpecs<I>, DomainError>;

    /// Persist a validated submission
    async fn on_valid(&self, main: M, inline: InlineChanges<I>) -> Result<SavedRecords<M, I>, DomainError>;
}
