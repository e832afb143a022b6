//! Genre model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::{detail_url, AbsoluteUrl};

pub const GENRE_NAME_HELP: &str = "Enter a book genre (e.g. Science Fiction, French Poetry etc.)";

/// Book genre, unique by case-insensitive name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

impl std::fmt::Display for Genre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl AbsoluteUrl for Genre {
    fn get_absolute_url(&self) -> String {
        detail_url("genre", self.id)
    }
}

/// Create genre request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateGenre {
    #[validate(length(min = 1, max = 200, message = "Genre name must be 1-200 characters"))]
    pub name: String,
}

/// Update genre request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateGenre {
    #[validate(length(min = 1, max = 200, message = "Genre name must be 1-200 characters"))]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_and_url() {
        let genre = Genre { id: 7, name: "Science Fiction".to_string() };
        assert_eq!(genre.to_string(), "Science Fiction");
        assert_eq!(genre.get_absolute_url(), "/catalog/genre/7");
    }

    #[test]
    fn test_name_length_limits() {
        assert!(CreateGenre { name: "Fantasy".into() }.validate().is_ok());
        assert!(CreateGenre { name: String::new() }.validate().is_err());
        assert!(CreateGenre { name: "x".repeat(201) }.validate().is_err());
        assert!(UpdateGenre::default().validate().is_ok());
    }
}
