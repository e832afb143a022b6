//! Repository layer for database operations

pub mod authors;
pub mod book_instances;
pub mod books;
pub mod genres;
pub mod languages;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        author::{Author, CreateAuthor, UpdateAuthor},
        book::{Book, BookListRow, CreateBook, UpdateBook},
        book_instance::{BookInstance, BookInstanceQuery, CreateBookInstance, UpdateBookInstance},
        genre::{CreateGenre, Genre, UpdateGenre},
        language::{CreateLanguage, Language, UpdateLanguage},
    },
};

/// Persistence surface the catalog service works against.
///
/// Every call is one short unit of work; constraint and referential failures
/// come back as `AppError` values, never retried here.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn genre_list(&self) -> AppResult<Vec<Genre>>;
    async fn genre_get(&self, id: i64) -> AppResult<Genre>;
    async fn genre_create(&self, data: &CreateGenre) -> AppResult<Genre>;
    async fn genre_update(&self, id: i64, data: &UpdateGenre) -> AppResult<Genre>;
    async fn genre_delete(&self, id: i64) -> AppResult<()>;

    async fn language_list(&self) -> AppResult<Vec<Language>>;
    async fn language_get(&self, id: i64) -> AppResult<Language>;
    async fn language_create(&self, data: &CreateLanguage) -> AppResult<Language>;
    async fn language_update(&self, id: i64, data: &UpdateLanguage) -> AppResult<Language>;
    async fn language_delete(&self, id: i64) -> AppResult<()>;

    async fn author_list(&self) -> AppResult<Vec<Author>>;
    async fn author_get(&self, id: i64) -> AppResult<Author>;
    async fn author_create(&self, data: &CreateAuthor) -> AppResult<Author>;
    async fn author_update(&self, id: i64, data: &UpdateAuthor) -> AppResult<Author>;
    async fn author_delete(&self, id: i64) -> AppResult<()>;
    async fn author_books(&self, author_id: i64) -> AppResult<Vec<Book>>;

    async fn book_list(&self) -> AppResult<Vec<Book>>;
    async fn book_list_rows(&self) -> AppResult<Vec<BookListRow>>;
    async fn book_get(&self, id: i64) -> AppResult<Book>;
    async fn book_create(&self, data: &CreateBook) -> AppResult<Book>;
    async fn book_update(&self, id: i64, data: &UpdateBook) -> AppResult<Book>;
    async fn book_delete(&self, id: i64) -> AppResult<()>;
    async fn book_genres(&self, book_id: i64) -> AppResult<Vec<Genre>>;
    async fn book_add_genre(&self, book_id: i64, genre_id: i64) -> AppResult<()>;
    async fn book_remove_genre(&self, book_id: i64, genre_id: i64) -> AppResult<()>;
    async fn book_set_genres(&self, book_id: i64, genre_ids: &[i64]) -> AppResult<()>;
    async fn book_instances(&self, book_id: i64) -> AppResult<Vec<BookInstance>>;

    async fn instance_list(&self, query: &BookInstanceQuery, today: NaiveDate) -> AppResult<Vec<BookInstance>>;
    async fn instance_get(&self, id: Uuid) -> AppResult<BookInstance>;
    async fn instance_create(&self, data: &CreateBookInstance) -> AppResult<BookInstance>;
    async fn instance_update(&self, id: Uuid, data: &UpdateBookInstance) -> AppResult<BookInstance>;
    async fn instance_delete(&self, id: Uuid) -> AppResult<()>;
}

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub genres: genres::GenresRepository,
    pub languages: languages::LanguagesRepository,
    pub authors: authors::AuthorsRepository,
    pub books: books::BooksRepository,
    pub book_instances: book_instances::BookInstancesRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            genres: genres::GenresRepository::new(pool.clone()),
            languages: languages::LanguagesRepository::new(pool.clone()),
            authors: authors::AuthorsRepository::new(pool.clone()),
            books: books::BooksRepository::new(pool.clone()),
            book_instances: book_instances::BookInstancesRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl CatalogStore for Repository {
    async fn genre_list(&self) -> AppResult<Vec<Genre>> {
        self.genres.list().await
    }

    async fn genre_get(&self, id: i64) -> AppResult<Genre> {
        self.genres.get_by_id(id).await
    }

    async fn genre_create(&self, data: &CreateGenre) -> AppResult<Genre> {
        self.genres.create(data).await
    }

    async fn genre_update(&self, id: i64, data: &UpdateGenre) -> AppResult<Genre> {
        self.genres.update(id, data).await
    }

    async fn genre_delete(&self, id: i64) -> AppResult<()> {
        self.genres.delete(id).await
    }

    async fn language_list(&self) -> AppResult<Vec<Language>> {
        self.languages.list().await
    }

    async fn language_get(&self, id: i64) -> AppResult<Language> {
        self.languages.get_by_id(id).await
    }

    async fn language_create(&self, data: &CreateLanguage) -> AppResult<Language> {
        self.languages.create(data).await
    }

    async fn language_update(&self, id: i64, data: &UpdateLanguage) -> AppResult<Language> {
        self.languages.update(id, data).await
    }

    async fn language_delete(&self, id: i64) -> AppResult<()> {
        self.languages.delete(id).await
    }

    async fn author_list(&self) -> AppResult<Vec<Author>> {
        self.authors.list().await
    }

    async fn author_get(&self, id: i64) -> AppResult<Author> {
        self.authors.get_by_id(id).await
    }

    async fn author_create(&self, data: &CreateAuthor) -> AppResult<Author> {
        self.authors.create(data).await
    }

    async fn author_update(&self, id: i64, data: &UpdateAuthor) -> AppResult<Author> {
        self.authors.update(id, data).await
    }

    async fn author_delete(&self, id: i64) -> AppResult<()> {
        self.authors.delete(id).await
    }

    async fn author_books(&self, author_id: i64) -> AppResult<Vec<Book>> {
        self.authors.books(author_id).await
    }

    async fn book_list(&self) -> AppResult<Vec<Book>> {
        self.books.list().await
    }

    async fn book_list_rows(&self) -> AppResult<Vec<BookListRow>> {
        self.books.list_rows().await
    }

    async fn book_get(&self, id: i64) -> AppResult<Book> {
        self.books.get_by_id(id).await
    }

    async fn book_create(&self, data: &CreateBook) -> AppResult<Book> {
        self.books.create(data).await
    }

    async fn book_update(&self, id: i64, data: &UpdateBook) -> AppResult<Book> {
        self.books.update(id, data).await
    }

    async fn book_delete(&self, id: i64) -> AppResult<()> {
        self.books.delete(id).await
    }

    async fn book_genres(&self, book_id: i64) -> AppResult<Vec<Genre>> {
        self.books.genres(book_id).await
    }

    async fn book_add_genre(&self, book_id: i64, genre_id: i64) -> AppResult<()> {
        self.books.add_genre(book_id, genre_id).await
    }

    async fn book_remove_genre(&self, book_id: i64, genre_id: i64) -> AppResult<()> {
        self.books.remove_genre(book_id, genre_id).await
    }

    async fn book_set_genres(&self, book_id: i64, genre_ids: &[i64]) -> AppResult<()> {
        self.books.set_genres(book_id, genre_ids).await
    }

    async fn book_instances(&self, book_id: i64) -> AppResult<Vec<BookInstance>> {
        self.books.instances(book_id).await
    }

    async fn instance_list(&self, query: &BookInstanceQuery, today: NaiveDate) -> AppResult<Vec<BookInstance>> {
        self.book_instances.list(query, today).await
    }

    async fn instance_get(&self, id: Uuid) -> AppResult<BookInstance> {
        self.book_instances.get_by_id(id).await
    }

    async fn instance_create(&self, data: &CreateBookInstance) -> AppResult<BookInstance> {
        self.book_instances.create(data).await
    }

    async fn instance_update(&self, id: Uuid, data: &UpdateBookInstance) -> AppResult<BookInstance> {
        self.book_instances.update(id, data).await
    }

    async fn instance_delete(&self, id: Uuid) -> AppResult<()> {
        self.book_instances.delete(id).await
    }
}
