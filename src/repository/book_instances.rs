//! Book instances repository

use chrono::NaiveDate;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::book_instance::{
        BookInstance, BookInstanceQuery, CreateBookInstance, DueBackRange, StatusFilter,
        UpdateBookInstance,
    },
};

const INSTANCE_SELECT: &str = r#"
    SELECT bi.id, bi.book_id, bi.imprint, bi.due_back, bi.status, b.title AS book_title
    FROM catalog_bookinstance bi
    LEFT JOIN catalog_book b ON b.id = bi.book_id
"#;

/// Copies without a due date come first
const INSTANCE_ORDER: &str = "ORDER BY bi.due_back ASC NULLS FIRST, bi.id";

#[derive(Clone)]
pub struct BookInstancesRepository {
    pool: Pool<Postgres>,
}

impl BookInstancesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List book instances with optional filters; date buckets are relative to `today`
    pub async fn list(&self, query: &BookInstanceQuery, today: NaiveDate) -> AppResult<Vec<BookInstance>> {
        let mut conditions = Vec::new();
        let mut idx = 1;

        match query.status {
            Some(StatusFilter::Blank) => conditions.push("bi.status IS NULL".to_string()),
            Some(StatusFilter::Is(_)) => {
                conditions.push(format!("bi.status = ${}", idx));
                idx += 1;
            }
            None => {}
        }

        let due_back = query.due_back.map(|f| f.range(today));
        match due_back {
            Some(DueBackRange::Between(_, _)) => {
                conditions.push(format!("bi.due_back >= ${} AND bi.due_back < ${}", idx, idx + 1));
                idx += 2;
            }
            Some(DueBackRange::Since(_)) => {
                conditions.push(format!("bi.due_back >= ${}", idx));
                idx += 1;
            }
            Some(DueBackRange::IsNull) => conditions.push("bi.due_back IS NULL".to_string()),
            Some(DueBackRange::IsNotNull) => conditions.push("bi.due_back IS NOT NULL".to_string()),
            None => {}
        }

        if query.book_id.is_some() {
            conditions.push(format!("bi.book_id = ${}", idx));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let select_q = format!("{} {} {}", INSTANCE_SELECT, where_clause, INSTANCE_ORDER);
        let mut builder = sqlx::query_as::<_, BookInstance>(&select_q);
        if let Some(StatusFilter::Is(status)) = query.status {
            builder = builder.bind(status);
        }
        match due_back {
            Some(DueBackRange::Between(start, end)) => builder = builder.bind(start).bind(end),
            Some(DueBackRange::Since(start)) => builder = builder.bind(start),
            _ => {}
        }
        if let Some(book_id) = query.book_id {
            builder = builder.bind(book_id);
        }

        let rows = builder.fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// Get book instance by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<BookInstance> {
        let query = format!("{} WHERE bi.id = $1", INSTANCE_SELECT);
        sqlx::query_as::<_, BookInstance>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
    }

    /// Create a book instance, generating a random UUID when none is supplied
    pub async fn create(&self, data: &CreateBookInstance) -> AppResult<BookInstance> {
        let id = data.id.unwrap_or_else(Uuid::new_v4);

        sqlx::query(
            r#"
            INSERT INTO catalog_bookinstance (id, book_id, imprint, due_back, status)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(id)
        .bind(data.book_id)
        .bind(&data.imprint)
        .bind(data.due_back)
        .bind(data.resolved_status())
        .execute(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    /// Update a book instance. Status may be set to any value at any time.
    pub async fn update(&self, id: Uuid, data: &UpdateBookInstance) -> AppResult<BookInstance> {
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

        add_field!(data.book_id, "book_id");
        add_field!(data.imprint, "imprint");
        add_field!(data.due_back, "due_back");
        add_field!(data.status, "status");

        if sets.is_empty() {
            return self.get_by_id(id).await;
        }

        let query = format!(
            "UPDATE catalog_bookinstance SET {} WHERE id = ${}",
            sets.join(", "),
            idx
        );

        let mut builder = sqlx::query(&query);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.book_id);
        bind_field!(data.imprint);
        bind_field!(data.due_back);
        bind_field!(data.status);

        let result = builder.bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book instance {} not found", id)));
        }

        self.get_by_id(id).await
    }

    /// Delete a book instance
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM catalog_bookinstance WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::from_delete)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book instance {} not found", id)));
        }
        Ok(())
    }
}
