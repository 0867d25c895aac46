//! Application state for shared services

use std::sync::Arc;

use crate::domain::{
    Author, Book, DomainError, FormValidator, InlineWorkflow, TemplateRenderer, WorkflowConfig,
};
use crate::infrastructure::services::LibraryService;

/// Inline workflow editing an author together with its books
pub type AuthorWorkflow = InlineWorkflow<Author, Book>;

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub library: Arc<LibraryService>,
    pub author_create: Arc<AuthorWorkflow>,
    pub author_update: Arc<AuthorWorkflow>,
    pub renderer: Arc<dyn TemplateRenderer>,
}

impl AppState {
    /// Builds both author workflows from one configuration
    ///
    /// The create workflow links books through the `books` relation; the update
    /// workflow discovers it.
    pub fn new(
        library: LibraryService,
        workflow: WorkflowConfig,
        validator: Arc<dyn FormValidator>,
        renderer: Arc<dyn TemplateRenderer>,
    ) -> Result<Self, DomainError> {
        let author_create = InlineWorkflow::create(
            workflow.clone().with_relation_field("books"),
            library.authors(),
            library.books(),
            validator.clone(),
        )?;
        let author_update =
            InlineWorkflow::update(workflow, library.authors(), library.books(), validator)?;

        Ok(Self {
            library: Arc::new(library),
            author_create: Arc::new(author_create),
            author_update: Arc::new(author_update),
            renderer,
        })
    }
}
