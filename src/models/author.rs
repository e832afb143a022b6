//! Author model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::{detail_url, AbsoluteUrl};

/// Full author model from database.
///
/// Name combinations are not unique; two authors may share a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Author {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    /// Shown as "Died"
    pub date_of_death: Option<NaiveDate>,
}

impl Author {
    /// `"{last_name} {first_name}"`
    pub fn label(last_name: &str, first_name: &str) -> String {
        format!("{} {}", last_name, first_name)
    }
}

impl std::fmt::Display for Author {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.last_name, self.first_name)
    }
}

impl AbsoluteUrl for Author {
    fn get_absolute_url(&self) -> String {
        detail_url("author", self.id)
    }
}

/// Create author request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAuthor {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

/// Update author request.
///
/// Dates use a double option: absent leaves the column alone, `null` clears it.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateAuthor {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub date_of_birth: Option<Option<NaiveDate>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub date_of_death: Option<Option<NaiveDate>>,
}
