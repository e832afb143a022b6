//! Catalog integrity tests against a live store

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use sqlx::PgPool;

use locallibrary_catalog::{
    admin::AdminSite,
    models::{
        author::CreateAuthor,
        book::{CreateBook, UpdateBook},
        book_instance::{
            BookInstanceQuery, CreateBookInstance, DueBackFilter, LoanStatus, StatusFilter,
            UpdateBookInstance,
        },
        genre::CreateGenre,
        language::CreateLanguage,
        Author,
    },
    repository::Repository,
    services::{catalog::CatalogService, Services},
    AppError,
};

fn catalog(pool: PgPool) -> CatalogService {
    Services::new(Arc::new(Repository::new(pool)), AdminSite::default())
        .expect("Default admin site is valid")
        .catalog
}

fn genre(name: &str) -> CreateGenre {
    CreateGenre { name: name.to_string() }
}

async fn tolkien(catalog: &CatalogService) -> Author {
    catalog
        .create_author(CreateAuthor {
            first_name: "J.R.R.".into(),
            last_name: "Tolkien".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1892, 1, 3),
            date_of_death: NaiveDate::from_ymd_opt(1973, 9, 2),
        })
        .await
        .expect("Failed to create author")
}

fn hobbit(author_id: Option<i64>, language_id: Option<i64>, genre_ids: Vec<i64>) -> CreateBook {
    CreateBook {
        title: "The Hobbit".into(),
        summary: "There and back again".into(),
        isbn: "9780261102217".into(),
        author_id,
        language_id,
        genre_ids,
    }
}

fn copy(book_id: Option<i64>, due_back: Option<NaiveDate>) -> CreateBookInstance {
    CreateBookInstance {
        id: None,
        book_id,
        imprint: "Allen & Unwin, 1937".into(),
        due_back,
        status: None,
    }
}

#[sqlx::test(migrator = "locallibrary_catalog::MIGRATOR")]
#[ignore]
async fn test_genre_names_are_case_insensitive_unique(pool: PgPool) {
    let catalog = catalog(pool);

    catalog.create_genre(genre("Fiction")).await.unwrap();
    let err = catalog.create_genre(genre("fiction")).await.unwrap_err();

    match err {
        AppError::ConstraintViolation(msg) => {
            assert_eq!(msg, "Genre already exists (case insensitive match)")
        }
        other => panic!("Expected constraint violation, got {:?}", other),
    }
}

#[sqlx::test(migrator = "locallibrary_catalog::MIGRATOR")]
#[ignore]
async fn test_language_names_are_case_insensitive_unique(pool: PgPool) {
    let catalog = catalog(pool);

    let english = catalog
        .create_language(CreateLanguage { name: "English".into() })
        .await
        .unwrap();
    let err = catalog
        .create_language(CreateLanguage { name: "ENGLISH".into() })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::ConstraintViolation(ref msg) if msg == "Language already exists (case insensitive match)"
    ));

    // Renaming onto an existing name is caught the same way
    let french = catalog
        .create_language(CreateLanguage { name: "French".into() })
        .await
        .unwrap();
    let err = catalog
        .update_language(
            french.id,
            locallibrary_catalog::models::language::UpdateLanguage {
                name: Some("english".into()),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ConstraintViolation(_)));
    assert_eq!(catalog.get_language(english.id).await.unwrap().name, "English");
}

#[sqlx::test(migrator = "locallibrary_catalog::MIGRATOR")]
#[ignore]
async fn test_author_delete_is_restricted_by_books(pool: PgPool) {
    let catalog = catalog(pool);
    let author = tolkien(&catalog).await;
    let book = catalog.create_book(hobbit(Some(author.id), None, vec![])).await.unwrap();

    let err = catalog.delete_author(author.id).await.unwrap_err();
    assert!(matches!(err, AppError::ReferentialIntegrity(_)));

    catalog.delete_book(book.id).await.unwrap();
    catalog.delete_author(author.id).await.unwrap();
    assert!(matches!(
        catalog.get_author(author.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[sqlx::test(migrator = "locallibrary_catalog::MIGRATOR")]
#[ignore]
async fn test_unreferenced_author_deletes(pool: PgPool) {
    let catalog = catalog(pool);
    let author = tolkien(&catalog).await;
    catalog.delete_author(author.id).await.unwrap();
    assert!(matches!(
        catalog.delete_author(author.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[sqlx::test(migrator = "locallibrary_catalog::MIGRATOR")]
#[ignore]
async fn test_language_delete_nulls_book_reference(pool: PgPool) {
    let catalog = catalog(pool);
    let english = catalog
        .create_language(CreateLanguage { name: "English".into() })
        .await
        .unwrap();
    let book = catalog
        .create_book(hobbit(None, Some(english.id), vec![]))
        .await
        .unwrap();
    assert_eq!(book.language_id, Some(english.id));

    catalog.delete_language(english.id).await.unwrap();

    let book = catalog.get_book(book.id).await.unwrap();
    assert_eq!(book.language_id, None);
}

#[sqlx::test(migrator = "locallibrary_catalog::MIGRATOR")]
#[ignore]
async fn test_book_delete_is_restricted_by_instances(pool: PgPool) {
    let catalog = catalog(pool);
    let book = catalog.create_book(hobbit(None, None, vec![])).await.unwrap();
    let instance = catalog.create_book_instance(copy(Some(book.id), None)).await.unwrap();

    let err = catalog.delete_book(book.id).await.unwrap_err();
    assert!(matches!(err, AppError::ReferentialIntegrity(_)));

    catalog.delete_book_instance(instance.id).await.unwrap();
    catalog.delete_book(book.id).await.unwrap();
}

#[sqlx::test(migrator = "locallibrary_catalog::MIGRATOR")]
#[ignore]
async fn test_duplicate_isbn_is_rejected(pool: PgPool) {
    let catalog = catalog(pool);
    catalog.create_book(hobbit(None, None, vec![])).await.unwrap();
    let err = catalog.create_book(hobbit(None, None, vec![])).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::ConstraintViolation(ref msg) if msg == "Book with this ISBN already exists"
    ));
}

#[sqlx::test(migrator = "locallibrary_catalog::MIGRATOR")]
#[ignore]
async fn test_display_genre_uses_first_three_associations(pool: PgPool) {
    let catalog = catalog(pool);
    let mut ids = Vec::new();
    for name in ["Fantasy", "Adventure", "Classic", "Epic"] {
        ids.push(catalog.create_genre(genre(name)).await.unwrap().id);
    }

    let book = catalog.create_book(hobbit(None, None, vec![])).await.unwrap();
    assert_eq!(catalog.display_genre(book.id).await.unwrap(), "");

    catalog.add_book_genre(book.id, ids[0]).await.unwrap();
    assert_eq!(catalog.display_genre(book.id).await.unwrap(), "Fantasy");

    catalog.set_book_genres(book.id, &ids).await.unwrap();
    assert_eq!(
        catalog.display_genre(book.id).await.unwrap(),
        "Fantasy, Adventure, Classic"
    );

    let rows = catalog.book_list_rows().await.unwrap();
    assert_eq!(rows[0].display_genre, "Fantasy, Adventure, Classic");
    assert_eq!(rows[0].author, None);

    catalog.remove_book_genre(book.id, ids[1]).await.unwrap();
    assert_eq!(
        catalog.display_genre(book.id).await.unwrap(),
        "Fantasy, Classic, Epic"
    );
}

#[sqlx::test(migrator = "locallibrary_catalog::MIGRATOR")]
#[ignore]
async fn test_genre_pair_is_unique_and_genre_delete_drops_association(pool: PgPool) {
    let catalog = catalog(pool);
    let fantasy = catalog.create_genre(genre("Fantasy")).await.unwrap();
    let book = catalog
        .create_book(hobbit(None, None, vec![fantasy.id]))
        .await
        .unwrap();

    let err = catalog.add_book_genre(book.id, fantasy.id).await.unwrap_err();
    assert!(matches!(err, AppError::ConstraintViolation(_)));

    catalog.delete_genre(fantasy.id).await.unwrap();
    assert!(catalog.book_genres(book.id).await.unwrap().is_empty());
}

#[sqlx::test(migrator = "locallibrary_catalog::MIGRATOR")]
#[ignore]
async fn test_instances_get_distinct_random_ids(pool: PgPool) {
    let catalog = catalog(pool);
    let book = catalog.create_book(hobbit(None, None, vec![])).await.unwrap();

    let first = catalog.create_book_instance(copy(Some(book.id), None)).await.unwrap();
    let second = catalog.create_book_instance(copy(Some(book.id), None)).await.unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(first.id.get_version_num(), 4);
    assert_eq!(second.id.get_version_num(), 4);
    assert_eq!(first.status, Some(LoanStatus::Maintenance));
    assert_eq!(
        catalog.book_instance_label(first.id).await.unwrap(),
        format!("{} (The Hobbit)", first.id)
    );
}

#[sqlx::test(migrator = "locallibrary_catalog::MIGRATOR")]
#[ignore]
async fn test_instances_order_and_filters(pool: PgPool) {
    let catalog = catalog(pool);
    let book = catalog.create_book(hobbit(None, None, vec![])).await.unwrap();
    let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();

    let later = catalog
        .create_book_instance(copy(Some(book.id), NaiveDate::from_ymd_opt(2024, 7, 1)))
        .await
        .unwrap();
    let undated = catalog.create_book_instance(copy(Some(book.id), None)).await.unwrap();
    let soon = catalog
        .create_book_instance(copy(Some(book.id), NaiveDate::from_ymd_opt(2024, 6, 10)))
        .await
        .unwrap();

    let all = catalog
        .list_book_instances(&BookInstanceQuery::default(), today)
        .await
        .unwrap();
    let order: Vec<_> = all.iter().map(|i| i.id).collect();
    assert_eq!(order, vec![undated.id, soon.id, later.id]);

    catalog
        .update_book_instance(
            soon.id,
            UpdateBookInstance {
                status: Some(Some(LoanStatus::OnLoan)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    // No transition rules: on loan straight to reserved
    catalog
        .update_book_instance(
            soon.id,
            UpdateBookInstance {
                status: Some(Some(LoanStatus::Reserved)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let blank = catalog
        .update_book_instance(
            later.id,
            UpdateBookInstance {
                status: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(blank.status, None);

    let reserved = catalog
        .list_book_instances(
            &BookInstanceQuery {
                status: Some(StatusFilter::Is(LoanStatus::Reserved)),
                ..Default::default()
            },
            today,
        )
        .await
        .unwrap();
    assert_eq!(reserved.len(), 1);
    assert_eq!(reserved[0].id, soon.id);

    let blank_rows = catalog
        .list_book_instances(
            &BookInstanceQuery {
                status: Some(StatusFilter::Blank),
                ..Default::default()
            },
            today,
        )
        .await
        .unwrap();
    assert_eq!(blank_rows.len(), 1);
    assert_eq!(blank_rows[0].id, later.id);

    let past_week = catalog
        .list_book_instances(
            &BookInstanceQuery {
                due_back: Some(DueBackFilter::PastSevenDays),
                ..Default::default()
            },
            today,
        )
        .await
        .unwrap();
    assert_eq!(past_week.len(), 1);

    let no_date = catalog
        .list_book_instances(
            &BookInstanceQuery {
                due_back: Some(DueBackFilter::NoDate),
                ..Default::default()
            },
            today,
        )
        .await
        .unwrap();
    let ids: HashSet<_> = no_date.iter().map(|i| i.id).collect();
    assert_eq!(ids, HashSet::from([undated.id]));
}

#[sqlx::test(migrator = "locallibrary_catalog::MIGRATOR")]
#[ignore]
async fn test_authors_ordered_and_book_inline(pool: PgPool) {
    let catalog = catalog(pool);
    let author = tolkien(&catalog).await;
    catalog
        .create_author(CreateAuthor {
            first_name: "Jane".into(),
            last_name: "Austen".into(),
            date_of_birth: None,
            date_of_death: None,
        })
        .await
        .unwrap();

    let names: Vec<String> = catalog
        .list_authors()
        .await
        .unwrap()
        .iter()
        .map(|a| a.to_string())
        .collect();
    assert_eq!(names, vec!["Austen Jane", "Tolkien J.R.R."]);

    let book = catalog.create_book(hobbit(Some(author.id), None, vec![])).await.unwrap();
    let books = catalog.books_by_author(author.id).await.unwrap();
    assert_eq!(books, vec![book.clone()]);

    let rows = catalog.book_list_rows().await.unwrap();
    assert_eq!(rows[0].author.as_deref(), Some("Tolkien J.R.R."));

    // Clearing the author lifts the restriction
    catalog
        .update_book(
            book.id,
            UpdateBook {
                author_id: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    catalog.delete_author(author.id).await.unwrap();
}
