//! Record store trait definition

use std::fmt::Debug;

use async_trait::async_trait;

use super::entity::Entity;
use super::value::RecordId;
use crate::domain::DomainError;

/// Persistence contract for one entity type
#[async_trait]
pub trait RecordStore<E>: Send + Sync + Debug
where
    E: Entity,
{
    /// Retrieves a record by its id
    async fn get(&self, id: RecordId) -> Result<Option<E>, DomainError>;

    /// Retrieves a record by its id, failing with `NotFound` when absent
    async fn get_required(&self, id: RecordId) -> Result<E, DomainError> {
        self.get(id).await?.ok_or_else(|| {
            DomainError::not_found(format!("{} {} not found", E::schema().name, id))
        })
    }

    /// Retrieves all records ordered by id
    async fn list(&self) -> Result<Vec<E>, DomainError>;

    /// Inserts a record without id (assigning one) or updates the record with its id
    async fn save(&self, entity: E) -> Result<E, DomainError>;

    /// Deletes a record by its id, returns true if deleted
    async fn delete(&self, id: RecordId) -> Result<bool, DomainError>;

    /// Records whose `foreign_key` field references `parent`, ordered by id
    async fn list_related(
        &self,
        foreign_key: &str,
        parent: RecordId,
    ) -> Result<Vec<E>, DomainError>;

    /// Returns the count of records
    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.list().await?.len())
    }
}
