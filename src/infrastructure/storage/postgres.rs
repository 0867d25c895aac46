//! PostgreSQL record store with connection pooling

use std::fmt::Debug;
use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;

use crate::domain::record::{Entity, RecordId, RecordStore};
use crate::domain::DomainError;

/// PostgreSQL connection configuration
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
    /// Idle timeout in seconds
    pub idle_timeout_secs: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/inline_crud".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 30,
            idle_timeout_secs: 600,
        }
    }
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    /// Opens a pool shared by every record store of the process
    pub async fn connect(&self) -> Result<PgPool, DomainError> {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(Duration::from_secs(self.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(self.idle_timeout_secs))
            .connect(&self.url)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))
    }
}

/// Record store keeping each record as JSON next to a database-assigned id
pub struct PostgresRecordStore<E>
where
    E: Entity,
{
    pool: PgPool,
    table_name: String,
    _phantom: PhantomData<E>,
}

impl<E> Debug for PostgresRecordStore<E>
where
    E: Entity,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresRecordStore")
            .field("table_name", &self.table_name)
            .finish()
    }
}

impl<E> PostgresRecordStore<E>
where
    E: Entity,
{
    pub fn new(pool: PgPool, table_name: impl Into<String>) -> Self {
        Self {
            pool,
            table_name: table_name.into(),
            _phantom: PhantomData,
        }
    }

    /// Default table name for the entity type, e.g. `author_records`
    pub fn default_table_name() -> String {
        format!("{}_records", E::schema().name)
    }

    /// Ensures the record table exists
    pub async fn ensure_table(&self) -> Result<(), DomainError> {
        let query = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id BIGSERIAL PRIMARY KEY,
                data JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            self.table_name
        );

        sqlx::query(&query)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create table: {}", e)))?;

        Ok(())
    }

    fn decode(row: &PgRow) -> Result<E, DomainError> {
        let id: i64 = row.get("id");
        let data: serde_json::Value = row.get("data");

        let mut record: E = serde_json::from_value(data).map_err(|e| {
            DomainError::storage(format!("Failed to deserialize {}: {}", E::schema().name, e))
        })?;
        record.set_id(from_db_id(id)?);
        Ok(record)
    }

    fn decode_all(rows: Vec<PgRow>) -> Result<Vec<E>, DomainError> {
        rows.iter().map(Self::decode).collect()
    }

    fn encode(record: &E) -> Result<serde_json::Value, DomainError> {
        let mut data = serde_json::to_value(record).map_err(|e| {
            DomainError::storage(format!("Failed to serialize {}: {}", E::schema().name, e))
        })?;
        // the id column is authoritative
        if let Some(object) = data.as_object_mut() {
            object.remove("id");
        }
        Ok(data)
    }
}

/// `None` for ids above `i64::MAX`, which no BIGSERIAL row can carry
fn to_db_id(id: RecordId) -> Option<i64> {
    i64::try_from(id.get()).ok()
}

fn from_db_id(id: i64) -> Result<RecordId, DomainError> {
    u64::try_from(id)
        .map(RecordId::new)
        .map_err(|_| DomainError::storage(format!("Invalid record id {} in database", id)))
}

#[async_trait]
impl<E> RecordStore<E> for PostgresRecordStore<E>
where
    E: Entity,
{
    async fn get(&self, id: RecordId) -> Result<Option<E>, DomainError> {
        let Some(db_id) = to_db_id(id) else {
            return Ok(None);
        };
        let query = format!("SELECT id, data FROM {} WHERE id = $1", self.table_name);

        let row = sqlx::query(&query)
            .bind(db_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get record: {}", e)))?;

        row.as_ref().map(Self::decode).transpose()
    }

    async fn list(&self) -> Result<Vec<E>, DomainError> {
        let query = format!("SELECT id, data FROM {} ORDER BY id", self.table_name);

        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list records: {}", e)))?;

        Self::decode_all(rows)
    }

    async fn save(&self, mut record: E) -> Result<E, DomainError> {
        let data = Self::encode(&record)?;

        match record.id() {
            Some(id) => {
                let query = format!(
                    r#"
                    UPDATE {}
                    SET data = $2, updated_at = NOW()
                    WHERE id = $1
                    "#,
                    self.table_name
                );

                let not_found = || {
                    DomainError::not_found(format!("{} {} not found", E::schema().name, id))
                };
                let db_id = to_db_id(id).ok_or_else(not_found)?;

                let result = sqlx::query(&query)
                    .bind(db_id)
                    .bind(&data)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| DomainError::storage(format!("Failed to update record: {}", e)))?;

                if result.rows_affected() == 0 {
                    return Err(not_found());
                }
            }
            None => {
                let query = format!(
                    "INSERT INTO {} (data) VALUES ($1) RETURNING id",
                    self.table_name
                );

                let row = sqlx::query(&query)
                    .bind(&data)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|e| DomainError::storage(format!("Failed to insert record: {}", e)))?;

                record.set_id(from_db_id(row.get("id"))?);
            }
        }

        Ok(record)
    }

    async fn delete(&self, id: RecordId) -> Result<bool, DomainError> {
        let Some(db_id) = to_db_id(id) else {
            return Ok(false);
        };
        let query = format!("DELETE FROM {} WHERE id = $1", self.table_name);

        let result = sqlx::query(&query)
            .bind(db_id)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete record: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_related(
        &self,
        foreign_key: &str,
        parent: RecordId,
    ) -> Result<Vec<E>, DomainError> {
        let query = format!(
            "SELECT id, data FROM {} WHERE data->>$1 = $2 ORDER BY id",
            self.table_name
        );

        let rows = sqlx::query(&query)
            .bind(foreign_key)
            .bind(parent.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list related records: {}", e)))?;

        Self::decode_all(rows)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let query = format!("SELECT COUNT(*) as count FROM {}", self.table_name);

        let row = sqlx::query(&query)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count records: {}", e)))?;

        let count: i64 = row.get("count");
        Ok(count as usize)
    }
}
