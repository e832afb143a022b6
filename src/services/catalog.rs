//! Catalog management service

use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, CreateAuthor, UpdateAuthor},
        book::{display_genre, Book, BookListRow, CreateBook, UpdateBook},
        book_instance::{
            BookInstance, BookInstanceListRow, BookInstanceQuery, CreateBookInstance,
            UpdateBookInstance,
        },
        genre::{CreateGenre, Genre, UpdateGenre},
        language::{CreateLanguage, Language, UpdateLanguage},
    },
    repository::CatalogStore,
};

fn log_blocked(entity: &str, id: impl std::fmt::Display) -> impl FnOnce(&AppError) {
    let entity = entity.to_string();
    let id = id.to_string();
    move |e: &AppError| {
        if e.is_integrity_error() {
            tracing::warn!("Catalog delete blocked: {} id={}: {}", entity, id, e);
        }
    }
}

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    // =========================================================================
    // GENRES
    // =========================================================================

    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        tracing::debug!("Catalog: listing genres");
        self.store.genre_list().await
    }

    pub async fn get_genre(&self, id: i64) -> AppResult<Genre> {
        tracing::debug!("Catalog: get genre id={}", id);
        self.store.genre_get(id).await
    }

    /// Create a genre. Names are unique regardless of letter case.
    pub async fn create_genre(&self, data: CreateGenre) -> AppResult<Genre> {
        data.validate()?;
        let genre = self.store.genre_create(&data).await?;
        tracing::info!("Catalog: created genre id={} name={:?}", genre.id, genre.name);
        Ok(genre)
    }

    pub async fn update_genre(&self, id: i64, data: UpdateGenre) -> AppResult<Genre> {
        data.validate()?;
        let genre = self.store.genre_update(id, &data).await?;
        tracing::info!("Catalog: updated genre id={} name={:?}", genre.id, genre.name);
        Ok(genre)
    }

    pub async fn delete_genre(&self, id: i64) -> AppResult<()> {
        self.store.genre_delete(id).await?;
        tracing::info!("Catalog: deleted genre id={}", id);
        Ok(())
    }

    // =========================================================================
    // LANGUAGES
    // =========================================================================

    pub async fn list_languages(&self) -> AppResult<Vec<Language>> {
        tracing::debug!("Catalog: listing languages");
        self.store.language_list().await
    }

    pub async fn get_language(&self, id: i64) -> AppResult<Language> {
        tracing::debug!("Catalog: get language id={}", id);
        self.store.language_get(id).await
    }

    /// Create a language. Names are unique regardless of letter case.
    pub async fn create_language(&self, data: CreateLanguage) -> AppResult<Language> {
        data.validate()?;
        let language = self.store.language_create(&data).await?;
        tracing::info!("Catalog: created language id={} name={:?}", language.id, language.name);
        Ok(language)
    }

    pub async fn update_language(&self, id: i64, data: UpdateLanguage) -> AppResult<Language> {
        data.validate()?;
        let language = self.store.language_update(id, &data).await?;
        tracing::info!("Catalog: updated language id={} name={:?}", language.id, language.name);
        Ok(language)
    }

    /// Delete a language; books that used it keep existing without one
    pub async fn delete_language(&self, id: i64) -> AppResult<()> {
        self.store.language_delete(id).await?;
        tracing::info!("Catalog: deleted language id={}", id);
        Ok(())
    }

    // =========================================================================
    // AUTHORS
    // =========================================================================

    /// Authors ordered by last name, then first name
    pub async fn list_authors(&self) -> AppResult<Vec<Author>> {
        tracing::debug!("Catalog: listing authors");
        self.store.author_list().await
    }

    pub async fn get_author(&self, id: i64) -> AppResult<Author> {
        tracing::debug!("Catalog: get author id={}", id);
        self.store.author_get(id).await
    }

    pub async fn create_author(&self, data: CreateAuthor) -> AppResult<Author> {
        data.validate()?;
        let author = self.store.author_create(&data).await?;
        tracing::info!("Catalog: created author id={} ({})", author.id, author);
        Ok(author)
    }

    pub async fn update_author(&self, id: i64, data: UpdateAuthor) -> AppResult<Author> {
        data.validate()?;
        let author = self.store.author_update(id, &data).await?;
        tracing::info!("Catalog: updated author id={} ({})", author.id, author);
        Ok(author)
    }

    /// Delete an author. Fails while any book references it.
    pub async fn delete_author(&self, id: i64) -> AppResult<()> {
        self.store
            .author_delete(id)
            .await
            .inspect_err(log_blocked("author", id))?;
        tracing::info!("Catalog: deleted author id={}", id);
        Ok(())
    }

    /// Books of an author (inline of the author view)
    pub async fn books_by_author(&self, author_id: i64) -> AppResult<Vec<Book>> {
        tracing::debug!("Catalog: books of author id={}", author_id);
        self.store.author_get(author_id).await?;
        self.store.author_books(author_id).await
    }

    // =========================================================================
    // BOOKS
    // =========================================================================

    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        tracing::debug!("Catalog: listing books");
        self.store.book_list().await
    }

    /// Rows of the book list view: (title, author, genre)
    pub async fn book_list_rows(&self) -> AppResult<Vec<BookListRow>> {
        tracing::debug!("Catalog: listing book rows");
        self.store.book_list_rows().await
    }

    pub async fn get_book(&self, id: i64) -> AppResult<Book> {
        tracing::debug!("Catalog: get book id={}", id);
        self.store.book_get(id).await
    }

    /// Create a book with its genres. Referenced author, language and genres must exist.
    pub async fn create_book(&self, data: CreateBook) -> AppResult<Book> {
        data.validate()?;
        self.check_references(data.author_id, data.language_id).await?;
        for genre_id in &data.genre_ids {
            self.store.genre_get(*genre_id).await?;
        }

        let book = self.store.book_create(&data).await?;
        tracing::info!(
            "Catalog: created book id={} title={:?} with {} genre(s)",
            book.id,
            book.title,
            data.genre_ids.len()
        );
        Ok(book)
    }

    pub async fn update_book(&self, id: i64, data: UpdateBook) -> AppResult<Book> {
        data.validate()?;
        self.check_references(data.author_id.flatten(), data.language_id.flatten())
            .await?;
        let book = self.store.book_update(id, &data).await?;
        tracing::info!("Catalog: updated book id={} title={:?}", book.id, book.title);
        Ok(book)
    }

    /// Delete a book. Fails while any book instance references it.
    pub async fn delete_book(&self, id: i64) -> AppResult<()> {
        self.store
            .book_delete(id)
            .await
            .inspect_err(log_blocked("book", id))?;
        tracing::info!("Catalog: deleted book id={}", id);
        Ok(())
    }

    async fn check_references(&self, author_id: Option<i64>, language_id: Option<i64>) -> AppResult<()> {
        if let Some(author_id) = author_id {
            self.store.author_get(author_id).await?;
        }
        if let Some(language_id) = language_id {
            self.store.language_get(language_id).await?;
        }
        Ok(())
    }

    /// Genres of a book in association order
    pub async fn book_genres(&self, book_id: i64) -> AppResult<Vec<Genre>> {
        tracing::debug!("Catalog: genres of book id={}", book_id);
        self.store.book_get(book_id).await?;
        self.store.book_genres(book_id).await
    }

    /// First three genre names of a book, recomputed on every call
    pub async fn display_genre(&self, book_id: i64) -> AppResult<String> {
        let genres = self.book_genres(book_id).await?;
        Ok(display_genre(genres.iter().map(|g| g.name.as_str())))
    }

    pub async fn add_book_genre(&self, book_id: i64, genre_id: i64) -> AppResult<()> {
        self.store.book_get(book_id).await?;
        self.store.genre_get(genre_id).await?;
        self.store.book_add_genre(book_id, genre_id).await?;
        tracing::info!("Catalog: added genre id={} to book id={}", genre_id, book_id);
        Ok(())
    }

    pub async fn remove_book_genre(&self, book_id: i64, genre_id: i64) -> AppResult<()> {
        self.store.book_remove_genre(book_id, genre_id).await?;
        tracing::info!("Catalog: removed genre id={} from book id={}", genre_id, book_id);
        Ok(())
    }

    /// Replace the genres of a book
    pub async fn set_book_genres(&self, book_id: i64, genre_ids: &[i64]) -> AppResult<()> {
        self.store.book_get(book_id).await?;
        for (pos, genre_id) in genre_ids.iter().enumerate() {
            if genre_ids[..pos].contains(genre_id) {
                return Err(AppError::ConstraintViolation(
                    "Genre is already associated with this book".to_string(),
                ));
            }
            self.store.genre_get(*genre_id).await?;
        }
        self.store.book_set_genres(book_id, genre_ids).await?;
        tracing::info!("Catalog: set genres of book id={} to {:?}", book_id, genre_ids);
        Ok(())
    }

    /// Copies of a book (inline of the book view)
    pub async fn instances_for_book(&self, book_id: i64) -> AppResult<Vec<BookInstance>> {
        tracing::debug!("Catalog: instances of book id={}", book_id);
        self.store.book_get(book_id).await?;
        self.store.book_instances(book_id).await
    }

    // =========================================================================
    // BOOK INSTANCES
    // =========================================================================

    /// Book instances, earliest due date first with undated copies leading
    pub async fn list_book_instances(
        &self,
        query: &BookInstanceQuery,
        today: NaiveDate,
    ) -> AppResult<Vec<BookInstance>> {
        tracing::debug!("Catalog: listing book instances {:?}", query);
        self.store.instance_list(query, today).await
    }

    /// Rows of the book instance list view: (book, status, due back)
    pub async fn book_instance_list_rows(
        &self,
        query: &BookInstanceQuery,
        today: NaiveDate,
    ) -> AppResult<Vec<BookInstanceListRow>> {
        tracing::debug!("Catalog: listing book instance rows {:?}", query);
        let instances = self.store.instance_list(query, today).await?;
        Ok(instances.iter().map(BookInstanceListRow::from).collect())
    }

    pub async fn get_book_instance(&self, id: Uuid) -> AppResult<BookInstance> {
        tracing::debug!("Catalog: get book instance id={}", id);
        self.store.instance_get(id).await
    }

    /// `"{id} ({book title})"`; fails for a copy with no book
    pub async fn book_instance_label(&self, id: Uuid) -> AppResult<String> {
        self.store.instance_get(id).await?.label()
    }

    pub async fn create_book_instance(&self, data: CreateBookInstance) -> AppResult<BookInstance> {
        data.validate()?;
        if let Some(book_id) = data.book_id {
            self.store.book_get(book_id).await?;
        }
        let instance = self.store.instance_create(&data).await?;
        tracing::info!(
            "Catalog: created book instance id={} book={:?}",
            instance.id,
            instance.book_id
        );
        Ok(instance)
    }

    /// Update a book instance; any status may replace any other
    pub async fn update_book_instance(&self, id: Uuid, data: UpdateBookInstance) -> AppResult<BookInstance> {
        data.validate()?;
        if let Some(Some(book_id)) = data.book_id {
            self.store.book_get(book_id).await?;
        }
        let instance = self.store.instance_update(id, &data).await?;
        tracing::info!(
            "Catalog: updated book instance id={} status={:?}",
            instance.id,
            instance.status
        );
        Ok(instance)
    }

    pub async fn delete_book_instance(&self, id: Uuid) -> AppResult<()> {
        self.store.instance_delete(id).await?;
        tracing::info!("Catalog: deleted book instance id={}", id);
        Ok(())
    }
}
