//! In-memory record store implementation

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::record::{Entity, FieldValue, RecordId, RecordStore};
use crate::domain::DomainError;

#[derive(Debug)]
struct State<E> {
    next_id: u64,
    records: BTreeMap<RecordId, E>,
}

/// Thread-safe in-memory record store
///
/// Ids are assigned in increasing order starting at 1. Data is lost when the
/// process terminates.
#[derive(Debug)]
pub struct InMemoryRecordStore<E>
where
    E: Entity,
{
    state: RwLock<State<E>>,
}

impl<E> Default for InMemoryRecordStore<E>
where
    E: Entity,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E> InMemoryRecordStore<E>
where
    E: Entity,
{
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State {
                next_id: 1,
                records: BTreeMap::new(),
            }),
        }
    }

    /// Creates a store holding `records`; those without an id get one assigned
    pub fn with_records(records: Vec<E>) -> Result<Self, DomainError> {
        let store = Self::new();
        {
            let mut state = store.write()?;
            for record in records {
                insert(&mut state, record)?;
            }
        }
        Ok(store)
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, State<E>>, DomainError> {
        self.state
            .read()
            .map_err(|e| DomainError::storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, State<E>>, DomainError> {
        self.state
            .write()
            .map_err(|e| DomainError::storage(format!("Failed to acquire write lock: {}", e)))
    }
}

fn insert<E: Entity>(state: &mut State<E>, mut record: E) -> Result<E, DomainError> {
    let id = match record.id() {
        Some(id) => id,
        None => {
            let id = RecordId::new(state.next_id);
            if state.records.contains_key(&id) {
                return Err(DomainError::storage(format!(
                    "No {} ids left to assign",
                    E::schema().name
                )));
            }
            record.set_id(id);
            id
        }
    };
    state.next_id = state.next_id.max(id.get().saturating_add(1));
    state.records.insert(id, record.clone());
    Ok(record)
}

#[async_trait]
impl<E> RecordStore<E> for InMemoryRecordStore<E>
where
    E: Entity,
{
    async fn get(&self, id: RecordId) -> Result<Option<E>, DomainError> {
        Ok(self.read()?.records.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<E>, DomainError> {
        Ok(self.read()?.records.values().cloned().collect())
    }

    async fn save(&self, record: E) -> Result<E, DomainError> {
        let mut state = self.write()?;

        if let Some(id) = record.id() {
            if !state.records.contains_key(&id) {
                return Err(DomainError::not_found(format!(
                    "{} {} not found",
                    E::schema().name,
                    id
                )));
            }
        }

        insert(&mut state, record)
    }

    async fn delete(&self, id: RecordId) -> Result<bool, DomainError> {
        Ok(self.write()?.records.remove(&id).is_some())
    }

    async fn list_related(
        &self,
        foreign_key: &str,
        parent: RecordId,
    ) -> Result<Vec<E>, DomainError> {
        let parent = FieldValue::from(parent);

        Ok(self
            .read()?
            .records
            .values()
            .filter(|record| record.get(foreign_key).as_ref() == Some(&parent))
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.read()?.records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::library::{Author, Book};

    #[tokio::test]
    async fn test_save_assigns_increasing_ids() {
        let store: InMemoryRecordStore<Author> = InMemoryRecordStore::new();

        let first = store.save(Author::new("Jane")).await.unwrap();
        let second = store.save(Author::new("Mary")).await.unwrap();

        assert_eq!(first.id(), Some(RecordId::new(1)));
        assert_eq!(second.id(), Some(RecordId::new(2)));
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_save_updates_existing() {
        let store: InMemoryRecordStore<Author> = InMemoryRecordStore::new();
        let mut author = store.save(Author::new("Jane")).await.unwrap();

        author.set("name", FieldValue::text("Jane Austen")).unwrap();
        store.save(author.clone()).await.unwrap();

        let stored = store.get_required(author.id().unwrap()).await.unwrap();
        assert_eq!(stored.name(), "Jane Austen");
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_save_unknown_id_is_not_found() {
        let store: InMemoryRecordStore<Author> = InMemoryRecordStore::new();
        let mut author = Author::new("Jane");
        author.set_id(RecordId::new(5));

        let err = store.save(author).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete() {
        let store: InMemoryRecordStore<Author> = InMemoryRecordStore::new();
        let author = store.save(Author::new("Jane")).await.unwrap();
        let id = author.id().unwrap();

        assert!(store.delete(id).await.unwrap());
        assert!(!store.delete(id).await.unwrap());
        assert!(store.get(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_related_filters_by_parent() {
        let store = InMemoryRecordStore::with_records(vec![
            Book::new("Emma").with_author(RecordId::new(1)),
            Book::new("Frankenstein").with_author(RecordId::new(2)),
            Book::new("Persuasion").with_author(RecordId::new(1)),
        ])
        .unwrap();

        let titles: Vec<_> = store
            .list_related("author", RecordId::new(1))
            .await
            .unwrap()
            .iter()
            .map(|book| book.title().to_string())
            .collect();
        assert_eq!(titles, ["Emma", "Persuasion"]);
    }

    #[tokio::test]
    async fn test_with_records_keeps_given_ids() {
        let mut author = Author::new("Jane");
        author.set_id(RecordId::new(10));
        let store = InMemoryRecordStore::with_records(vec![author]).unwrap();

        let next = store.save(Author::new("Mary")).await.unwrap();
        assert_eq!(next.id(), Some(RecordId::new(11)));
    }

    #[tokio::test]
    async fn test_preset_max_id_does_not_overflow() {
        let mut author = Author::new("Jane");
        author.set_id(RecordId::new(u64::MAX));
        let store = InMemoryRecordStore::with_records(vec![author]).unwrap();

        let err = store.save(Author::new("Mary")).await.unwrap_err();
        assert!(matches!(err, DomainError::Storage { .. }));
        assert_eq!(
            store.get(RecordId::new(u64::MAX)).await.unwrap().map(|a| a.name().to_string()),
            Some("Jane".to_string())
        );
    }
}
