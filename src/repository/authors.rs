//! Authors repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, CreateAuthor, UpdateAuthor},
        book::Book,
    },
};

const AUTHOR_COLUMNS: &str = "id, first_name, last_name, date_of_birth, date_of_death";

#[derive(Clone)]
pub struct AuthorsRepository {
    pool: Pool<Postgres>,
}

impl AuthorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List authors ordered by last name, then first name
    pub async fn list(&self) -> AppResult<Vec<Author>> {
        let query = format!(
            "SELECT {} FROM catalog_author ORDER BY last_name, first_name, id",
            AUTHOR_COLUMNS
        );
        let rows = sqlx::query_as::<_, Author>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get author by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Author> {
        let query = format!("SELECT {} FROM catalog_author WHERE id = $1", AUTHOR_COLUMNS);
        sqlx::query_as::<_, Author>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))
    }

    /// Create an author
    pub async fn create(&self, data: &CreateAuthor) -> AppResult<Author> {
        let query = format!(
            r#"
            INSERT INTO catalog_author (first_name, last_name, date_of_birth, date_of_death)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            AUTHOR_COLUMNS
        );
        let row = sqlx::query_as::<_, Author>(&query)
            .bind(&data.first_name)
            .bind(&data.last_name)
            .bind(data.date_of_birth)
            .bind(data.date_of_death)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    /// Update an author, touching only the provided fields
    pub async fn update(&self, id: i64, data: &UpdateAuthor) -> AppResult<Author> {
        let mut sets = Vec::new();
        let mut idx = 1;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.first_name, "first_name");
        add_field!(data.last_name, "last_name");
        add_field!(data.date_of_birth, "date_of_birth");
        add_field!(data.date_of_death, "date_of_death");

        if sets.is_empty() {
            return self.get_by_id(id).await;
        }

        let query = format!(
            "UPDATE catalog_author SET {} WHERE id = ${} RETURNING {}",
            sets.join(", "),
            idx,
            AUTHOR_COLUMNS
        );

        let mut builder = sqlx::query_as::<_, Author>(&query);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.first_name);
        bind_field!(data.last_name);
        bind_field!(data.date_of_birth);
        bind_field!(data.date_of_death);

        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))
    }

    /// Delete an author. Rejected by the store while any book references it.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM catalog_author WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::from_delete)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Author {} not found", id)));
        }
        Ok(())
    }

    /// Books written by an author
    pub async fn books(&self, author_id: i64) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, title, summary, isbn, author_id, language_id
            FROM catalog_book
            WHERE author_id = $1
            ORDER BY title, id
            "#,
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
