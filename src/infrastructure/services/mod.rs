//! Infrastructure services

mod library_service;

pub use library_service::{AuthorDetail, LibraryService};
