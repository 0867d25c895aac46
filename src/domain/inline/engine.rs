//! The shared request pipeline for a main record edited with its inline children

use std::sync::Arc;

use tracing::{debug, warn};

use super::config::{validate_fields, WorkflowConfig};
use super::context::RequestContext;
use super::create::CreateVariant;
use super::outcome::{
    FormContext, InlineChanges, RenderedForm, SavedRecords, ValidationOutcome, WorkflowResponse,
};
use super::success_url::SuccessUrl;
use super::update::UpdateVariant;
use super::variant::{VariantKind, WorkflowVariant};
use crate::domain::form::{ExistingRecord, Form, FormData, FormSet, FormValidator};
use crate::domain::record::{Entity, RecordStore};
use crate::domain::DomainError;

/// Forms built for one request, plus the children the formset edits
struct BoundForms<I> {
    main_form: Form,
    formset: FormSet,
    existing: Vec<I>,
}

/// Inline editing workflow for main type `M` and inline type `I`
#[derive(Debug)]
pub struct InlineWorkflow<M, I>
where
    M: Entity,
    I: Entity,
{
    variant: Arc<dyn WorkflowVariant<M, I>>,
    validator: Arc<dyn FormValidator>,
    success_url: Option<SuccessUrl>,
    template_name: String,
}

impl<M, I> InlineWorkflow<M, I>
where
    M: Entity,
    I: Entity,
{
    /// Validates the configuration; every error surfaces here rather than per request
    pub fn new(
        config: &WorkflowConfig,
        variant: Arc<dyn WorkflowVariant<M, I>>,
        validator: Arc<dyn FormValidator>,
    ) -> Result<Self, DomainError> {
        validate_fields::<M, I>(config)?;

        let success_url = config
            .success_url_template
            .as_deref()
            .map(|template| SuccessUrl::parse(template, M::schema()))
            .transpose()?;

        let template_name = config.template_name.clone().unwrap_or_else(|| {
            format!(
                "{}_{}_with_{}",
                M::schema().name,
                variant.kind(),
                variant.relation().name
            )
        });

        Ok(Self {
            variant,
            validator,
            success_url,
            template_name,
        })
    }

    /// Workflow creating a main record together with its children
    pub fn create(
        config: WorkflowConfig,
        main_store: Arc<dyn RecordStore<M>>,
        inline_store: Arc<dyn RecordStore<I>>,
        validator: Arc<dyn FormValidator>,
    ) -> Result<Self, DomainError> {
        let config = Arc::new(config);
        let variant = CreateVariant::new(config.clone(), main_store, inline_store)?;
        Self::new(&config, Arc::new(variant), validator)
    }

    /// Workflow editing an existing main record and its children
    pub fn update(
        config: WorkflowConfig,
        main_store: Arc<dyn RecordStore<M>>,
        inline_store: Arc<dyn RecordStore<I>>,
        validator: Arc<dyn FormValidator>,
    ) -> Result<Self, DomainError> {
        let config = Arc::new(config);
        let variant = UpdateVariant::new(config.clone(), main_store, inline_store)?;
        Self::new(&config, Arc::new(variant), validator)
    }

    pub fn kind(&self) -> VariantKind {
        self.variant.kind()
    }

    pub fn template_name(&self) -> &str {
        &self.template_name
    }

    /// Route a request to the read or write path by its method
    pub async fn dispatch(&self, request: &RequestContext) -> Result<WorkflowResponse, DomainError> {
        if request.method.is_read() {
            self.handle_read(request).await.map(WorkflowResponse::Render)
        } else if request.method.is_write() {
            self.handle_write(request).await
        } else {
            Err(DomainError::method_not_allowed(request.method.to_string()))
        }
    }

    /// Present unbound forms for the resolved main record
    pub async fn handle_read(&self, request: &RequestContext) -> Result<RenderedForm, DomainError> {
        let main = self.variant.resolve_initial_main(request).await?;
        let forms = self.build_forms(main.as_ref(), None).await?;

        debug!(
            variant = %self.kind(),
            rows = forms.formset.rows().len(),
            "Rendering inline forms"
        );

        Ok(self.rendered(forms, main.as_ref()))
    }

    /// Validate a submission and persist it, or re-render it with its errors
    pub async fn handle_write(&self, request: &RequestContext) -> Result<WorkflowResponse, DomainError> {
        let main = self.variant.resolve_initial_main(request).await?;
        let empty = FormData::new();
        let data = request.data.as_ref().unwrap_or(&empty);
        let forms = self.build_forms(main.as_ref(), Some(data)).await?;
        let object = main.as_ref().map(Entity::values);

        match self.validate(main, &forms)? {
            ValidationOutcome::Valid { main, inline } => {
                let saved = self.save(main, inline).await?;
                let location = self.success_location(&saved.main)?;
                Ok(WorkflowResponse::Redirect(location))
            }
            ValidationOutcome::Invalid {
                main_errors,
                inline_errors,
                non_form_errors,
            } => {
                warn!(
                    variant = %self.kind(),
                    main_errors = main_errors.len(),
                    inline_rows_with_errors = inline_errors.iter().filter(|e| !e.is_empty()).count(),
                    non_form_errors = ?non_form_errors,
                    "Submission rejected"
                );

                Ok(WorkflowResponse::Render(RenderedForm {
                    template: self.template_name.clone(),
                    context: FormContext {
                        main_form: forms.main_form,
                        inline_forms: forms.formset,
                        object,
                    },
                }))
            }
        }
    }

    /// Check both forms; a valid outcome carries the entities to write
    fn validate(&self, main: Option<M>, forms: &BoundForms<I>) -> Result<ValidationOutcome<M, I>, DomainError> {
        let (Some(cleaned), Some(changes)) = (forms.main_form.cleaned_data(), forms.formset.changes()) else {
            return Ok(ValidationOutcome::Invalid {
                main_errors: forms.main_form.errors().clone(),
                inline_errors: forms.formset.errors(),
                non_form_errors: forms.formset.non_form_errors().to_vec(),
            });
        };

        let mut main = main.unwrap_or_default();
        main.apply(cleaned)?;

        let mut saved = Vec::with_capacity(changes.saved.len());
        for change in changes.saved {
            let mut child = match change.id {
                Some(id) => forms
                    .existing
                    .iter()
                    .find(|child| child.id() == Some(id))
                    .cloned()
                    .ok_or_else(|| {
                        DomainError::internal(format!("{} {} is not in the formset", I::schema().name, id))
                    })?,
                None => I::default(),
            };
            child.apply(&change.values)?;
            saved.push(child);
        }

        Ok(ValidationOutcome::Valid {
            main,
            inline: InlineChanges {
                saved,
                deleted: changes.deleted,
            },
        })
    }

    async fn save(&self, main: M, inline: InlineChanges<I>) -> Result<SavedRecords<M, I>, DomainError> {
        self.variant.on_valid(main, inline).await.inspect_err(|e| {
            warn!(variant = %self.kind(), error = %e, "Failed to save submission");
        })
    }

    fn success_location(&self, main: &M) -> Result<String, DomainError> {
        match &self.success_url {
            Some(url) => Ok(url.render(main)),
            None => main.absolute_url().ok_or_else(|| {
                DomainError::configuration(format!(
                    "no URL to redirect to: configure a success URL or give {} an absolute URL",
                    M::schema().name
                ))
            }),
        }
    }

    async fn build_forms(&self, main: Option<&M>, data: Option<&FormData>) -> Result<BoundForms<I>, DomainError> {
        let main_spec = self.variant.build_main_form_spec();
        let instance = main.map(Entity::values);
        let main_form = self.validator.build_form(&main_spec, data, instance.as_ref());

        let inline = self.variant.build_inline_form_specs(main).await?;
        let records: Vec<ExistingRecord> = inline
            .existing
            .iter()
            .filter_map(|child| {
                child.id().map(|id| ExistingRecord {
                    id,
                    values: child.values(),
                })
            })
            .collect();
        let formset = self.validator.build_form_set(&inline.formset, data, &records);

        Ok(BoundForms {
            main_form,
            formset,
            existing: inline.existing,
        })
    }

    fn rendered(&self, forms: BoundForms<I>, main: Option<&M>) -> RenderedForm {
        RenderedForm {
            template: self.template_name.clone(),
            context: FormContext {
                main_form: forms.main_form,
                inline_forms: forms.formset,
                object: main.map(Entity::values),
            },
        }
    }
}
