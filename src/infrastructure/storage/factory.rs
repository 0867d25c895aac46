//! Storage factory for runtime backend selection

use std::str::FromStr;
use std::sync::Arc;

use sqlx::postgres::PgPool;
use tracing::info;

use crate::domain::record::{Entity, RecordStore};
use crate::domain::DomainError;

use super::in_memory::InMemoryRecordStore;
use super::postgres::{PostgresConfig, PostgresRecordStore};

/// Supported storage backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    /// In-memory storage (for testing/development)
    InMemory,
    Postgres,
}

impl FromStr for StorageType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Ok(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            other => Err(DomainError::configuration(format!(
                "unknown storage backend '{}'",
                other
            ))),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone)]
pub enum StorageConfig {
    InMemory,
    Postgres(PostgresConfig),
}

impl StorageConfig {
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    pub fn postgres_url(url: impl Into<String>) -> Self {
        Self::Postgres(PostgresConfig::new(url))
    }

    pub fn storage_type(&self) -> StorageType {
        match self {
            Self::InMemory => StorageType::InMemory,
            Self::Postgres(_) => StorageType::Postgres,
        }
    }
}

/// Creates record stores for one configured backend
///
/// A PostgreSQL backend shares a single pool between every store it creates.
#[derive(Debug, Clone)]
pub struct StorageFactory {
    pool: Option<PgPool>,
}

impl StorageFactory {
    pub async fn connect(config: &StorageConfig) -> Result<Self, DomainError> {
        let pool = match config {
            StorageConfig::InMemory => None,
            StorageConfig::Postgres(pg_config) => Some(pg_config.connect().await?),
        };

        info!(backend = ?config.storage_type(), "Storage backend ready");
        Ok(Self { pool })
    }

    pub fn in_memory() -> Self {
        Self { pool: None }
    }

    pub fn storage_type(&self) -> StorageType {
        match self.pool {
            Some(_) => StorageType::Postgres,
            None => StorageType::InMemory,
        }
    }

    /// Record store for `E`, creating its table when needed
    pub async fn create<E>(&self) -> Result<Arc<dyn RecordStore<E>>, DomainError>
    where
        E: Entity,
    {
        match &self.pool {
            None => Ok(Arc::new(InMemoryRecordStore::<E>::new())),
            Some(pool) => {
                let store = PostgresRecordStore::<E>::new(
                    pool.clone(),
                    PostgresRecordStore::<E>::default_table_name(),
                );
                store.ensure_table().await?;
                Ok(Arc::new(store))
            }
        }
    }
}
