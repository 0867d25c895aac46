//! Inline CRUD service
//!
//! Edits an author and its books in a single form submission:
//! - Create and update workflows sharing one validation pipeline
//! - Inline formsets with management data, per-row deletion and blank extra rows
//! - In-memory or PostgreSQL record storage

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use tracing::info;

use api::state::AppState;
use config::WorkflowSettings;
use domain::{
    Author, Book, Entity, RecordStore, SchemaFormValidator, WorkflowConfig,
};
use infrastructure::render::JsonTemplateRenderer;
use infrastructure::services::LibraryService;
use infrastructure::storage::StorageFactory;

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let storage = StorageFactory::connect(&config.storage.storage_config()?).await?;
    let authors = storage.create::<Author>().await?;
    let books = storage.create::<Book>().await?;

    if config.storage.seed_demo {
        seed_demo(authors.as_ref(), books.as_ref()).await?;
    }

    let validator = SchemaFormValidator::new().with_blank_extra_rows(config.workflow.blank_extra_rows);
    let state = AppState::new(
        LibraryService::new(authors, books),
        author_workflow_config(&config.workflow),
        Arc::new(validator),
        Arc::new(JsonTemplateRenderer::new()),
    )?;

    Ok(state)
}

/// Author workflows edit the author's name and each book's title
pub fn author_workflow_config(settings: &WorkflowSettings) -> WorkflowConfig {
    let mut config = WorkflowConfig::new(["name"], ["title"]).with_extra(settings.extra);

    if let Some(template) = &settings.success_url_template {
        config = config.with_success_url_template(template.clone());
    }
    if let Some(prefix) = &settings.form_prefix {
        config = config.with_form_prefix(prefix.clone());
    }

    config
}

/// Insert a demo author with two books unless authors already exist
async fn seed_demo(
    authors: &dyn RecordStore<Author>,
    books: &dyn RecordStore<Book>,
) -> anyhow::Result<()> {
    if authors.count().await? > 0 {
        return Ok(());
    }

    let author = authors.save(Author::new("Jane Austen")).await?;
    let Some(id) = author.id() else {
        anyhow::bail!("seeded author has no id");
    };
    for title in ["Emma", "Persuasion"] {
        books.save(Book::new(title).with_author(id)).await?;
    }

    info!(id = %id, "Seeded demo author");
    Ok(())
}
