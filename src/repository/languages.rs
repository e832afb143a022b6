//! Languages repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::language::{CreateLanguage, Language, UpdateLanguage},
};

#[derive(Clone)]
pub struct LanguagesRepository {
    pool: Pool<Postgres>,
}

impl LanguagesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all languages
    pub async fn list(&self) -> AppResult<Vec<Language>> {
        let rows = sqlx::query_as::<_, Language>("SELECT id, name FROM catalog_language ORDER BY name, id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get language by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Language> {
        sqlx::query_as::<_, Language>("SELECT id, name FROM catalog_language WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Language {} not found", id)))
    }

    /// Create a language; a case-insensitive duplicate name is rejected by the store
    pub async fn create(&self, data: &CreateLanguage) -> AppResult<Language> {
        let row = sqlx::query_as::<_, Language>(
            "INSERT INTO catalog_language (name) VALUES ($1) RETURNING id, name",
        )
        .bind(&data.name)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update a language
    pub async fn update(&self, id: i64, data: &UpdateLanguage) -> AppResult<Language> {
        let Some(ref name) = data.name else {
            return self.get_by_id(id).await;
        };

        sqlx::query_as::<_, Language>(
            "UPDATE catalog_language SET name = $1 WHERE id = $2 RETURNING id, name",
        )
        .bind(name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Language {} not found", id)))
    }

    /// Delete a language; books written in it keep existing with no language
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM catalog_language WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::from_delete)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Language {} not found", id)));
        }
        Ok(())
    }
}
