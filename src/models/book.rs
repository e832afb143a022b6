//! Book model (a title, not a specific copy) and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::{detail_url, AbsoluteUrl};

/// Number of genre names shown in list views
pub const DISPLAY_GENRE_LIMIT: usize = 3;

pub const SUMMARY_HELP: &str = "Enter a brief description of the book";
pub const ISBN_HELP: &str = "13 Character ISBN number";
pub const GENRE_HELP: &str = "select a genre for this book";

/// Full book model from database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub summary: String,
    pub isbn: String,
    /// Cannot be deleted while referenced
    pub author_id: Option<i64>,
    /// Nulled when the language is deleted
    pub language_id: Option<i64>,
}

impl std::fmt::Display for Book {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title)
    }
}

impl AbsoluteUrl for Book {
    fn get_absolute_url(&self) -> String {
        detail_url("book", self.id)
    }
}

/// Join the first three genre names with ", ", keeping the given order.
pub fn display_genre<I, S>(names: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .take(DISPLAY_GENRE_LIMIT)
        .map(|name| name.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Row of the book list view: (title, author, genre)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookListRow {
    pub id: i64,
    pub title: String,
    pub author: Option<String>,
    pub display_genre: String,
}

/// Create book request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 1000, message = "Summary must be 1-1000 characters"))]
    pub summary: String,
    #[validate(length(min = 1, max = 13, message = "ISBN must be 1-13 characters"))]
    pub isbn: String,
    pub author_id: Option<i64>,
    pub language_id: Option<i64>,
    /// Associated genres, in display order
    #[serde(default)]
    pub genre_ids: Vec<i64>,
}

/// Update book request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 1000, message = "Summary must be 1-1000 characters"))]
    pub summary: Option<String>,
    #[validate(length(min = 1, max = 13, message = "ISBN must be 1-13 characters"))]
    pub isbn: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub author_id: Option<Option<i64>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub language_id: Option<Option<i64>>,
}
