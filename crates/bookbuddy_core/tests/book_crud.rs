use bookbuddy_core::{
    parse_publication_year, BookPatch, BookService, Database, GenreService, Missing, NewBook,
    ReadingStatus, RepoError, ValidationError,
};
use rusqlite::params;

fn dune() -> NewBook {
    NewBook::new("Dune", "Frank Herbert", "978-0441172719")
        .with_publication_year(Some(1965))
        .with_genre(Some("Science Fiction"))
}

fn count(db: &Database, table: &str) -> i64 {
    db.connect()
        .unwrap()
        .query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
            row.get(0)
        })
        .unwrap()
}

#[test]
fn add_book_creates_genre_once_and_reuses_it() {
    let db = Database::open_in_memory().unwrap();
    let service = BookService::new(&db);

    let first = service.add_book(&dune()).unwrap();
    assert_eq!(count(&db, "genres"), 1);
    assert_eq!(count(&db, "books"), 1);
    assert!(first.genre_id.is_some());
    assert_eq!(first.status, ReadingStatus::ToRead);
    assert_eq!(first.created_at, first.updated_at);

    let second = service
        .add_book(
            &NewBook::new("Hyperion", "Dan Simmons", "978-0553283686")
                .with_genre(Some("  Science Fiction ")),
        )
        .unwrap();
    assert_eq!(count(&db, "genres"), 1);
    assert_eq!(count(&db, "books"), 2);
    assert_eq!(second.genre_id, first.genre_id);
}

#[test]
fn add_book_without_genre_leaves_genres_untouched() {
    let db = Database::open_in_memory().unwrap();
    let service = BookService::new(&db);

    let book = service
        .add_book(&NewBook::new("Emma", "Jane Austen", "isbn-emma").with_status(ReadingStatus::Reading))
        .unwrap();

    assert_eq!(book.genre_id, None);
    assert_eq!(book.status, ReadingStatus::Reading);
    assert_eq!(count(&db, "genres"), 0);
}

#[test]
fn duplicate_isbn_fails_without_partial_insert() {
    let db = Database::open_in_memory().unwrap();
    let service = BookService::new(&db);
    service.add_book(&dune()).unwrap();

    let books_before = count(&db, "books");
    let genres_before = count(&db, "genres");

    let err = service
        .add_book(
            &NewBook::new("Dune (reprint)", "Frank Herbert", "978-0441172719")
                .with_genre(Some("Classics")),
        )
        .unwrap_err();

    assert!(matches!(err, RepoError::Constraint(ref message) if message.contains("isbn")));
    assert_eq!(count(&db, "books"), books_before);
    assert_eq!(count(&db, "genres"), genres_before);
}

#[test]
fn malformed_publication_year_is_rejected_before_storage() {
    let err = parse_publication_year("nineteen sixty-five").unwrap_err();
    assert!(matches!(err, ValidationError::MalformedNumber { .. }));

    let db = Database::open_in_memory().unwrap();
    let service = BookService::new(&db);
    let err = service
        .add_book(&NewBook::new("Dune", "Frank Herbert", "isbn").with_publication_year(Some(-3)))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::NonPositiveYear(-3))
    ));
    assert_eq!(count(&db, "books"), 0);
}

#[test]
fn list_books_is_empty_then_ordered_by_id() {
    let db = Database::open_in_memory().unwrap();
    let service = BookService::new(&db);
    assert!(service.list_books().unwrap().is_empty());

    let a = service.add_book(&NewBook::new("A", "X", "isbn-a")).unwrap();
    let b = service.add_book(&NewBook::new("B", "Y", "isbn-b")).unwrap();
    let c = service.add_book(&NewBook::new("C", "Z", "isbn-c")).unwrap();

    let ids: Vec<_> = service
        .list_books()
        .unwrap()
        .into_iter()
        .map(|book| book.id)
        .collect();
    assert_eq!(ids, vec![a.id, b.id, c.id]);
}

#[test]
fn title_only_update_keeps_other_fields_and_advances_timestamp() {
    let db = Database::open_in_memory().unwrap();
    let service = BookService::new(&db);
    let original = service.add_book(&dune()).unwrap();

    db.connect()
        .unwrap()
        .execute(
            "UPDATE books SET created_at = 1000, updated_at = 1000 WHERE id = ?1;",
            params![original.id],
        )
        .unwrap();

    let patch = BookPatch {
        title: Some("Dune Messiah".to_string()),
        ..BookPatch::default()
    };
    let updated = service.update_book(original.id, &patch).unwrap();

    assert_eq!(updated.title, "Dune Messiah");
    assert_eq!(updated.author, original.author);
    assert_eq!(updated.isbn, original.isbn);
    assert_eq!(updated.publication_year, original.publication_year);
    assert_eq!(updated.genre_id, original.genre_id);
    assert_eq!(updated.status, original.status);
    assert_eq!(updated.created_at, 1000);
    assert!(updated.updated_at > 1000);

    let again = service.update_book(original.id, &BookPatch::default()).unwrap();
    assert!(again.updated_at >= updated.updated_at);
}

#[test]
fn update_can_change_status_and_genre() {
    let db = Database::open_in_memory().unwrap();
    let service = BookService::new(&db);
    let book = service.add_book(&dune()).unwrap();

    let patch = BookPatch {
        status: Some(ReadingStatus::Completed),
        genre: Some("Classics".to_string()),
        publication_year: Some(1966),
        ..BookPatch::default()
    };
    let updated = service.update_book(book.id, &patch).unwrap();

    assert_eq!(updated.status, ReadingStatus::Completed);
    assert_eq!(updated.publication_year, Some(1966));
    let genres = GenreService::new(&db).list_genres().unwrap();
    let classics = genres.iter().find(|genre| genre.name == "Classics").unwrap();
    assert_eq!(updated.genre_id, Some(classics.id));
}

#[test]
fn update_of_missing_book_reports_not_found() {
    let db = Database::open_in_memory().unwrap();
    let service = BookService::new(&db);

    let patch = BookPatch {
        title: Some("Ghost".to_string()),
        ..BookPatch::default()
    };
    let err = service.update_book(404, &patch).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(Missing::Book(404))));
}

#[test]
fn invalid_patch_applies_nothing() {
    let db = Database::open_in_memory().unwrap();
    let service = BookService::new(&db);
    let book = service.add_book(&dune()).unwrap();

    let patch = BookPatch {
        title: Some("New title".to_string()),
        isbn: Some("   ".to_string()),
        ..BookPatch::default()
    };
    let err = service.update_book(book.id, &patch).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::EmptyField("isbn"))
    ));
    assert_eq!(service.get_book(book.id).unwrap(), book);
}

#[test]
fn update_to_existing_isbn_is_rolled_back() {
    let db = Database::open_in_memory().unwrap();
    let service = BookService::new(&db);
    let first = service.add_book(&NewBook::new("A", "X", "isbn-a")).unwrap();
    let second = service.add_book(&NewBook::new("B", "Y", "isbn-b")).unwrap();

    let patch = BookPatch {
        title: Some("B, revised".to_string()),
        isbn: Some(first.isbn.clone()),
        ..BookPatch::default()
    };
    let err = service.update_book(second.id, &patch).unwrap_err();

    assert!(matches!(err, RepoError::Constraint(_)));
    assert_eq!(service.get_book(second.id).unwrap(), second);
}

#[test]
fn view_details_returns_every_attribute() {
    let db = Database::open_in_memory().unwrap();
    let service = BookService::new(&db);
    let book = service.add_book(&dune()).unwrap();

    let details = service.get_book_details(book.id).unwrap();
    assert_eq!(details.book, book);
    assert_eq!(
        details.genre.map(|genre| genre.name),
        Some("Science Fiction".to_string())
    );
    assert!(details.reviews.is_empty());
    assert!(details.book.created_at > 0);

    let err = service.get_book_details(book.id + 1).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn operations_work_against_a_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("collection.db");

    {
        let db = Database::open(&path).unwrap();
        BookService::new(&db).add_book(&dune()).unwrap();
    }

    let reopened = Database::open(&path).unwrap();
    let books = BookService::new(&reopened).list_books().unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].title, "Dune");
}
