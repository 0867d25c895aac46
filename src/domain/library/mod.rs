//! Library domain - the author / book demo entities
//!
//! An author owns any number of books through the `books` relation; each book
//! references its author through the `author` foreign key.

mod author;
mod book;

pub use author::{Author, AUTHOR_SCHEMA};
pub use book::{Book, BOOK_SCHEMA};

/// Maximum length of author names and book titles
pub const MAX_TEXT_LENGTH: usize = 256;
