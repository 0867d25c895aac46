//! Create variant - a new main record together with its first children

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::config::{resolve_relation, WorkflowConfig};
use super::context::RequestContext;
use super::outcome::{InlineChanges, SavedRecords};
use super::variant::{InlineFormSpecs, VariantKind, WorkflowVariant};
use crate::domain::form::{FormSetSpec, FormSpec};
use crate::domain::record::{Entity, FieldValue, RecordStore, RelationDef};
use crate::domain::DomainError;

/// Formset prefix used when none is configured
pub const CREATE_FORMSET_PREFIX: &str = "form";

#[derive(Debug)]
pub struct CreateVariant<M, I>
where
    M: Entity,
    I: Entity,
{
    config: Arc<WorkflowConfig>,
    relation: &'static RelationDef,
    main_store: Arc<dyn RecordStore<M>>,
    inline_store: Arc<dyn RecordStore<I>>,
}

impl<M, I> CreateVariant<M, I>
where
    M: Entity,
    I: Entity,
{
    /// The relation field must be configured
    pub fn new(
        config: Arc<WorkflowConfig>,
        main_store: Arc<dyn RecordStore<M>>,
        inline_store: Arc<dyn RecordStore<I>>,
    ) -> Result<Self, DomainError> {
        let relation = resolve_relation::<M, I>(&config, true)?;

        Ok(Self {
            config,
            relation,
            main_store,
            inline_store,
        })
    }
}

#[async_trait]
impl<M, I> WorkflowVariant<M, I> for CreateVariant<M, I>
where
    M: Entity,
    I: Entity,
{
    fn kind(&self) -> VariantKind {
        VariantKind::Create
    }

    fn relation(&self) -> &'static RelationDef {
        self.relation
    }

    async fn resolve_initial_main(&self, _request: &RequestContext) -> Result<Option<M>, DomainError> {
        Ok(None)
    }

    fn build_main_form_spec(&self) -> FormSpec {
        FormSpec::new(M::schema(), self.config.main_fields.clone())
            .with_prefix(self.config.form_prefix.clone())
            .with_initial(self.config.initial.clone())
    }

    async fn build_inline_form_specs(&self, _main: Option<&M>) -> Result<InlineFormSpecs<I>, DomainError> {
        let prefix = self
            .config
            .form_prefix
            .clone()
            .unwrap_or_else(|| CREATE_FORMSET_PREFIX.to_string());
        let form = FormSpec::new(I::schema(), self.config.inline_fields.clone());

        Ok(InlineFormSpecs {
            formset: FormSetSpec::new(form, prefix)
                .with_extra(self.config.extra)
                .with_can_delete(false),
            existing: Vec::new(),
        })
    }

    async fn on_valid(&self, main: M, inline: InlineChanges<I>) -> Result<SavedRecords<M, I>, DomainError> {
        let main = self.main_store.save(main).await?;
        let parent = main.id().ok_or_else(|| {
            DomainError::internal(format!("{} was saved without an id", M::schema().name))
        })?;
        debug!(parent = %parent, count = inline.saved.len(), "Saving inline records");

        let mut saved = Vec::with_capacity(inline.saved.len());
        for mut child in inline.saved {
            child.set(self.relation.foreign_key, FieldValue::from(parent))?;
            saved.push(self.inline_store.save(child).await?);
        }

        info!(
            entity = M::schema().name,
            id = %parent,
            children = saved.len(),
            "Created record with inline records"
        );

        Ok(SavedRecords {
            main,
            inline: saved,
            deleted: 0,
        })
    }
}
