//! Language model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::{detail_url, AbsoluteUrl};

pub const LANGUAGE_NAME_HELP: &str = "Enter the book natural language (e.g. French, English, Japanese, etc.)";

/// Natural language a book is written in, unique by case-insensitive name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Language {
    pub id: i64,
    pub name: String,
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl AbsoluteUrl for Language {
    fn get_absolute_url(&self) -> String {
        detail_url("language", self.id)
    }
}

/// Create language request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateLanguage {
    #[validate(length(min = 1, max = 200, message = "Language name must be 1-200 characters"))]
    pub name: String,
}

/// Update language request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateLanguage {
    #[validate(length(min = 1, max = 200, message = "Language name must be 1-200 characters"))]
    pub name: Option<String>,
}
