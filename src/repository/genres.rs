//! Genres repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::genre::{CreateGenre, Genre, UpdateGenre},
};

#[derive(Clone)]
pub struct GenresRepository {
    pool: Pool<Postgres>,
}

impl GenresRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all genres
    pub async fn list(&self) -> AppResult<Vec<Genre>> {
        let rows = sqlx::query_as::<_, Genre>("SELECT id, name FROM catalog_genre ORDER BY name, id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get genre by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Genre> {
        sqlx::query_as::<_, Genre>("SELECT id, name FROM catalog_genre WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Genre {} not found", id)))
    }

    /// Create a genre; a case-insensitive duplicate name is rejected by the store
    pub async fn create(&self, data: &CreateGenre) -> AppResult<Genre> {
        let row = sqlx::query_as::<_, Genre>(
            "INSERT INTO catalog_genre (name) VALUES ($1) RETURNING id, name",
        )
        .bind(&data.name)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update a genre
    pub async fn update(&self, id: i64, data: &UpdateGenre) -> AppResult<Genre> {
        let Some(ref name) = data.name else {
            return self.get_by_id(id).await;
        };

        sqlx::query_as::<_, Genre>(
            "UPDATE catalog_genre SET name = $1 WHERE id = $2 RETURNING id, name",
        )
        .bind(name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Genre {} not found", id)))
    }

    /// Delete a genre; its book associations go with it
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM catalog_genre WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::from_delete)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Genre {} not found", id)));
        }
        Ok(())
    }
}
