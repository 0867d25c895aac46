//! Update variant - an existing main record with its current children

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::config::{resolve_relation, WorkflowConfig};
use super::context::RequestContext;
use super::outcome::{InlineChanges, SavedRecords};
use super::variant::{InlineFormSpecs, VariantKind, WorkflowVariant};
use crate::domain::form::{FormSetSpec, FormSpec};
use crate::domain::record::{Entity, FieldValue, RecordId, RecordStore, RelationDef};
use crate::domain::DomainError;

#[derive(Debug)]
pub struct UpdateVariant<M, I>
where
    M: Entity,
    I: Entity,
{
    config: Arc<WorkflowConfig>,
    relation: &'static RelationDef,
    main_store: Arc<dyn RecordStore<M>>,
    inline_store: Arc<dyn RecordStore<I>>,
}

impl<M, I> UpdateVariant<M, I>
where
    M: Entity,
    I: Entity,
{
    /// Without a configured relation field the single relation to `I` is used
    pub fn new(
        config: Arc<WorkflowConfig>,
        main_store: Arc<dyn RecordStore<M>>,
        inline_store: Arc<dyn RecordStore<I>>,
    ) -> Result<Self, DomainError> {
        let relation = resolve_relation::<M, I>(&config, false)?;

        Ok(Self {
            config,
            relation,
            main_store,
            inline_store,
        })
    }

    fn parent_id(main: &M) -> Result<RecordId, DomainError> {
        main.id().ok_or_else(|| {
            DomainError::internal(format!("{} has no id", M::schema().name))
        })
    }
}

#[async_trait]
impl<M, I> WorkflowVariant<M, I> for UpdateVariant<M, I>
where
    M: Entity,
    I: Entity,
{
    fn kind(&self) -> VariantKind {
        VariantKind::Update
    }

    fn relation(&self) -> &'static RelationDef {
        self.relation
    }

    async fn resolve_initial_main(&self, request: &RequestContext) -> Result<Option<M>, DomainError> {
        let id = request.id.ok_or_else(|| {
            DomainError::not_found(format!("no {} id in request", M::schema().name))
        })?;

        self.main_store.get_required(id).await.map(Some)
    }

    fn build_main_form_spec(&self) -> FormSpec {
        FormSpec::new(M::schema(), self.config.main_fields.clone())
            .with_prefix(self.config.form_prefix.clone())
            .with_initial(self.config.initial.clone())
    }

    async fn build_inline_form_specs(&self, main: Option<&M>) -> Result<InlineFormSpecs<I>, DomainError> {
        let main = main.ok_or_else(|| {
            DomainError::internal(format!("no {} to edit", M::schema().name))
        })?;
        let existing = self
            .inline_store
            .list_related(self.relation.foreign_key, Self::parent_id(main)?)
            .await?;

        let prefix = self
            .config
            .form_prefix
            .clone()
            .unwrap_or_else(|| self.relation.name.to_string());
        let form = FormSpec::new(I::schema(), self.config.inline_fields.clone());

        Ok(InlineFormSpecs {
            formset: FormSetSpec::new(form, prefix)
                .with_extra(self.config.extra)
                .with_can_delete(true),
            existing,
        })
    }

    /// Saves the main record, then deletions, then updated and new children
    async fn on_valid(&self, main: M, inline: InlineChanges<I>) -> Result<SavedRecords<M, I>, DomainError> {
        let main = self.main_store.save(main).await?;
        let parent = Self::parent_id(&main)?;

        let mut deleted = 0;
        for id in &inline.deleted {
            if self.inline_store.delete(*id).await? {
                deleted += 1;
            }
        }

        let mut saved = Vec::with_capacity(inline.saved.len());
        for mut child in inline.saved {
            child.set(self.relation.foreign_key, FieldValue::from(parent))?;
            saved.push(self.inline_store.save(child).await?);
        }

        info!(
            entity = M::schema().name,
            id = %parent,
            saved = saved.len(),
            deleted = deleted,
            "Updated record with inline records"
        );

        Ok(SavedRecords {
            main,
            inline: saved,
            deleted,
        })
    }
}
