//! Data models for the catalog

pub mod author;
pub mod book;
pub mod book_instance;
pub mod genre;
pub mod language;

// Re-export commonly used types
pub use author::Author;
pub use book::{display_genre, Book, BookListRow};
pub use book_instance::{BookInstance, BookInstanceListRow, LoanStatus};
pub use genre::Genre;
pub use language::Language;

/// Path prefix of every detail view in the catalog
pub const CATALOG_URL_PREFIX: &str = "/catalog";

/// Canonical locator of an entity's detail view
pub trait AbsoluteUrl {
    fn get_absolute_url(&self) -> String;
}

pub(crate) fn detail_url(kind: &str, id: i64) -> String {
    format!("{}/{}/{}", CATALOG_URL_PREFIX, kind, id)
}
