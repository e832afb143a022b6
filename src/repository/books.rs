//! Books repository for database operations.
//!
//! Genre associations live in the `catalog_book_genre` join table; their
//! insertion order is the order genres are listed in.

use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        author::Author,
        book::{display_genre, Book, BookListRow, CreateBook, UpdateBook},
        book_instance::BookInstance,
        genre::Genre,
    },
};

const BOOK_COLUMNS: &str = "id, title, summary, isbn, author_id, language_id";

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all books
    pub async fn list(&self) -> AppResult<Vec<Book>> {
        let query = format!("SELECT {} FROM catalog_book ORDER BY title, id", BOOK_COLUMNS);
        let rows = sqlx::query_as::<_, Book>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Rows of the book list view, with the author label and the first genres
    pub async fn list_rows(&self) -> AppResult<Vec<BookListRow>> {
        let rows = sqlx::query(
            r#"
            SELECT b.id, b.title, a.first_name, a.last_name,
                   ARRAY(
                       SELECT g.name::text
                       FROM catalog_book_genre bg
                       JOIN catalog_genre g ON g.id = bg.genre_id
                       WHERE bg.book_id = b.id
                       ORDER BY bg.id
                   ) AS genre_names
            FROM catalog_book b
            LEFT JOIN catalog_author a ON a.id = b.author_id
            ORDER BY b.title, b.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let result = rows
            .into_iter()
            .map(|row| {
                let first_name: Option<String> = row.get("first_name");
                let last_name: Option<String> = row.get("last_name");
                let genre_names: Vec<String> = row.get("genre_names");
                BookListRow {
                    id: row.get("id"),
                    title: row.get("title"),
                    author: last_name
                        .zip(first_name)
                        .map(|(last, first)| Author::label(&last, &first)),
                    display_genre: display_genre(&genre_names),
                }
            })
            .collect();
        Ok(result)
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Book> {
        let query = format!("SELECT {} FROM catalog_book WHERE id = $1", BOOK_COLUMNS);
        sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    /// Create a book and its genre associations in one transaction
    pub async fn create(&self, data: &CreateBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let query = format!(
            r#"
            INSERT INTO catalog_book (title, summary, isbn, author_id, language_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            BOOK_COLUMNS
        );
        let book = sqlx::query_as::<_, Book>(&query)
            .bind(&data.title)
            .bind(&data.summary)
            .bind(&data.isbn)
            .bind(data.author_id)
            .bind(data.language_id)
            .fetch_one(&mut *tx)
            .await?;

        for genre_id in &data.genre_ids {
            sqlx::query("INSERT INTO catalog_book_genre (book_id, genre_id) VALUES ($1, $2)")
                .bind(book.id)
                .bind(genre_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(book)
    }

    /// Update a book, touching only the provided fields
    pub async fn update(&self, id: i64, data: &UpdateBook) -> AppResult<Book> {
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

        add_field!(data.title, "title");
        add_field!(data.summary, "summary");
        add_field!(data.isbn, "isbn");
        add_field!(data.author_id, "author_id");
        add_field!(data.language_id, "language_id");

        if sets.is_empty() {
            return self.get_by_id(id).await;
        }

        let query = format!(
            "UPDATE catalog_book SET {} WHERE id = ${} RETURNING {}",
            sets.join(", "),
            idx,
            BOOK_COLUMNS
        );

        let mut builder = sqlx::query_as::<_, Book>(&query);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.title);
        bind_field!(data.summary);
        bind_field!(data.isbn);
        bind_field!(data.author_id);
        bind_field!(data.language_id);

        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    /// Delete a book. Rejected by the store while any book instance references it.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM catalog_book WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::from_delete)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book {} not found", id)));
        }
        Ok(())
    }

    // =========================================================================
    // GENRES (catalog_book_genre junction)
    // =========================================================================

    /// Genres of a book in association order
    pub async fn genres(&self, book_id: i64) -> AppResult<Vec<Genre>> {
        let rows = sqlx::query_as::<_, Genre>(
            r#"
            SELECT g.id, g.name
            FROM catalog_book_genre bg
            JOIN catalog_genre g ON g.id = bg.genre_id
            WHERE bg.book_id = $1
            ORDER BY bg.id
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Associate a genre; the pair must not exist yet
    pub async fn add_genre(&self, book_id: i64, genre_id: i64) -> AppResult<()> {
        sqlx::query("INSERT INTO catalog_book_genre (book_id, genre_id) VALUES ($1, $2)")
            .bind(book_id)
            .bind(genre_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Drop a genre association
    pub async fn remove_genre(&self, book_id: i64, genre_id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM catalog_book_genre WHERE book_id = $1 AND genre_id = $2")
            .bind(book_id)
            .bind(genre_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Genre {} is not associated with book {}",
                genre_id, book_id
            )));
        }
        Ok(())
    }

    /// Replace all genre associations: delete existing rows then insert the new ones
    pub async fn set_genres(&self, book_id: i64, genre_ids: &[i64]) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM catalog_book_genre WHERE book_id = $1")
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        for genre_id in genre_ids {
            sqlx::query("INSERT INTO catalog_book_genre (book_id, genre_id) VALUES ($1, $2)")
                .bind(book_id)
                .bind(genre_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    // =========================================================================
    // INSTANCES
    // =========================================================================

    /// Copies of a book, earliest due date first
    pub async fn instances(&self, book_id: i64) -> AppResult<Vec<BookInstance>> {
        let rows = sqlx::query_as::<_, BookInstance>(
            r#"
            SELECT bi.id, bi.book_id, bi.imprint, bi.due_back, bi.status, b.title AS book_title
            FROM catalog_bookinstance bi
            JOIN catalog_book b ON b.id = bi.book_id
            WHERE bi.book_id = $1
            ORDER BY bi.due_back ASC NULLS FIRST, bi.id
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
