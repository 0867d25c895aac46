//! Check-config command - validates configuration without serving

use crate::config::AppConfig;
use crate::domain::{Author, Book, InlineWorkflow, SchemaFormValidator};
use crate::infrastructure::storage::InMemoryRecordStore;
use std::sync::Arc;

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    check(&config)?;

    println!(
        "Configuration OK (storage: {}, server: {}:{})",
        config.storage.backend, config.server.host, config.server.port
    );
    Ok(())
}

/// Everything `serve` would reject at startup, without connecting anywhere
pub fn check(config: &AppConfig) -> anyhow::Result<()> {
    config.storage.storage_config()?;
    super::serve::build_socket_addr(config)?;

    let workflow = crate::author_workflow_config(&config.workflow);
    let validator = Arc::new(SchemaFormValidator::new());
    InlineWorkflow::<Author, Book>::create(
        workflow.clone().with_relation_field("books"),
        Arc::new(InMemoryRecordStore::new()),
        Arc::new(InMemoryRecordStore::new()),
        validator.clone(),
    )?;
    InlineWorkflow::<Author, Book>::update(
        workflow,
        Arc::new(InMemoryRecordStore::new()),
        Arc::new(InMemoryRecordStore::new()),
        validator,
    )?;

    Ok(())
}
