//! Library service - author listing, detail and cascading delete

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::domain::{Author, Book, DomainError, Entity, RecordId, RecordStore, AUTHOR_SCHEMA};

/// An author with the books referencing it
#[derive(Debug, Clone, Serialize)]
pub struct AuthorDetail {
    pub author: Author,
    pub books: Vec<Book>,
}

/// Read and delete operations around authors and their books
#[derive(Debug, Clone)]
pub struct LibraryService {
    authors: Arc<dyn RecordStore<Author>>,
    books: Arc<dyn RecordStore<Book>>,
}

impl LibraryService {
    pub fn new(authors: Arc<dyn RecordStore<Author>>, books: Arc<dyn RecordStore<Book>>) -> Self {
        Self { authors, books }
    }

    pub fn authors(&self) -> Arc<dyn RecordStore<Author>> {
        self.authors.clone()
    }

    pub fn books(&self) -> Arc<dyn RecordStore<Book>> {
        self.books.clone()
    }

    /// All authors ordered by id
    pub async fn list_authors(&self) -> Result<Vec<Author>, DomainError> {
        self.authors.list().await
    }

    pub async fn get_author(&self, id: RecordId) -> Result<Author, DomainError> {
        self.authors.get_required(id).await
    }

    pub async fn author_detail(&self, id: RecordId) -> Result<AuthorDetail, DomainError> {
        let author = self.authors.get_required(id).await?;
        let books = self.books.list_related(Self::foreign_key(), id).await?;
        Ok(AuthorDetail { author, books })
    }

    /// Delete an author and every book referencing it
    pub async fn delete_author(&self, id: RecordId) -> Result<usize, DomainError> {
        let author = self.authors.get_required(id).await?;

        let books = self.books.list_related(Self::foreign_key(), id).await?;
        let mut removed = 0;
        for book in &books {
            if let Some(book_id) = book.id() {
                if self.books.delete(book_id).await? {
                    removed += 1;
                }
            }
        }

        self.authors.delete(id).await?;
        info!(id = %id, name = %author, books = removed, "Deleted author");

        Ok(removed)
    }

    fn foreign_key() -> &'static str {
        AUTHOR_SCHEMA
            .relation("books")
            .map(|relation| relation.foreign_key)
            .unwrap_or("author")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::InMemoryRecordStore;

    async fn service() -> (LibraryService, RecordId) {
        let authors = Arc::new(InMemoryRecordStore::<Author>::new());
        let books = Arc::new(InMemoryRecordStore::<Book>::new());

        let jane = authors.save(Author::new("Jane")).await.unwrap().id().unwrap();
        let mary = authors.save(Author::new("Mary")).await.unwrap().id().unwrap();
        books.save(Book::new("Emma").with_author(jane)).await.unwrap();
        books.save(Book::new("Persuasion").with_author(jane)).await.unwrap();
        books.save(Book::new("Frankenstein").with_author(mary)).await.unwrap();

        (LibraryService::new(authors, books), jane)
    }

    #[tokio::test]
    async fn test_author_detail_lists_books() {
        let (service, jane) = service().await;

        let detail = service.author_detail(jane).await.unwrap();
        assert_eq!(detail.author.name(), "Jane");
        assert_eq!(detail.books.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_author_is_not_found() {
        let (service, _) = service().await;
        let err = service.author_detail(RecordId::new(40)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_cascades_to_books() {
        let (service, jane) = service().await;

        assert_eq!(service.delete_author(jane).await.unwrap(), 2);
        assert_eq!(service.list_authors().await.unwrap().len(), 1);
        assert_eq!(service.books().count().await.unwrap(), 1);
        assert!(service.delete_author(jane).await.unwrap_err().is_not_found());
    }
}
