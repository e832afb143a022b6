//! Error types for the catalog

use sqlx::error::ErrorKind;
use thiserror::Error;

/// Postgres SQLSTATE for a value too long for its column type
const STRING_DATA_RIGHT_TRUNCATION: &str = "22001";

/// Human-readable messages for the named constraints declared in `migrations/`
const CONSTRAINT_MESSAGES: &[(&str, &str)] = &[
    (
        "genre_name_case_insensitive_unique",
        "Genre already exists (case insensitive match)",
    ),
    (
        "language_name_case_insensitive_unique",
        "Language already exists (case insensitive match)",
    ),
    ("book_isbn_unique", "Book with this ISBN already exists"),
    (
        "book_genre_pair_unique",
        "Genre is already associated with this book",
    ),
    (
        "book_author_restrict",
        "Author is referenced by one or more books and cannot be deleted",
    ),
    (
        "bookinstance_book_restrict",
        "Book is referenced by one or more book instances and cannot be deleted",
    ),
];

/// Messages for a write pointing at a record that does not exist
const MISSING_REFERENCE_MESSAGES: &[(&str, &str)] = &[
    ("book_author_restrict", "Author does not exist"),
    ("book_language_set_null", "Language does not exist"),
    ("book_genre_book_fk", "Book does not exist"),
    ("book_genre_genre_fk", "Genre does not exist"),
    ("bookinstance_book_restrict", "Book does not exist"),
];

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Uniqueness, field-length, required-field or check violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Restrict-on-delete blocked
    #[error("Referential integrity error: {0}")]
    ReferentialIntegrity(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Errors caused by the data itself rather than by the store being unavailable
    pub fn is_integrity_error(&self) -> bool {
        matches!(
            self,
            AppError::ConstraintViolation(_) | AppError::ReferentialIntegrity(_)
        )
    }
}

fn lookup(table: &[(&str, &'static str)], constraint: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(name, _)| *name == constraint)
        .map(|(_, message)| *message)
}

/// Look up the message attached to a named schema constraint
pub fn constraint_message(constraint: &str) -> Option<&'static str> {
    lookup(CONSTRAINT_MESSAGES, constraint)
}

/// Kind of statement that raised a store error.
///
/// A foreign key violation means a dangling reference on an insert or update
/// and a blocked restrict on a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statement {
    Write,
    Delete,
}

/// Map a store-reported error onto the catalog taxonomy.
///
/// Returns `None` when the error is not an integrity failure, in which case the
/// caller keeps it as a plain database error.
pub fn classify_database_error(
    statement: Statement,
    kind: ErrorKind,
    code: Option<&str>,
    constraint: Option<&str>,
    message: &str,
) -> Option<AppError> {
    let described = || {
        constraint
            .and_then(constraint_message)
            .map(str::to_string)
            .unwrap_or_else(|| message.to_string())
    };

    match kind {
        ErrorKind::UniqueViolation | ErrorKind::NotNullViolation | ErrorKind::CheckViolation => {
            Some(AppError::ConstraintViolation(described()))
        }
        ErrorKind::ForeignKeyViolation => match statement {
            Statement::Write => {
                let missing = constraint
                    .and_then(|c| lookup(MISSING_REFERENCE_MESSAGES, c))
                    .unwrap_or("Referenced record does not exist");
                Some(AppError::NotFound(missing.to_string()))
            }
            Statement::Delete => Some(AppError::ReferentialIntegrity(described())),
        },
        _ if code == Some(STRING_DATA_RIGHT_TRUNCATION) => {
            Some(AppError::ConstraintViolation(message.to_string()))
        }
        _ => None,
    }
}

impl AppError {
    fn from_store(err: sqlx::Error, statement: Statement) -> Self {
        if let Some(db) = err.as_database_error() {
            let code = db.code();
            if let Some(classified) = classify_database_error(
                statement,
                db.kind(),
                code.as_deref(),
                db.constraint(),
                db.message(),
            ) {
                return classified;
            }
        }
        tracing::error!("Database error: {:?}", err);
        AppError::Database(err)
    }

    /// Classify an error raised by a `DELETE`
    pub fn from_delete(err: sqlx::Error) -> Self {
        Self::from_store(err, Statement::Delete)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::from_store(err, Statement::Write)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(message) => format!("{}: {}", field, message),
                    None => format!("{}: {}", field, e.code),
                })
            })
            .collect();
        messages.sort();
        AppError::ConstraintViolation(messages.join("; "))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

/// Result type alias for catalog operations
pub type AppResult<T> = Result<T, AppError>;
