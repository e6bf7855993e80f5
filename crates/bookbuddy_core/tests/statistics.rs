use bookbuddy_core::{
    BookPatch, BookService, Database, GenreService, NewBook, NewReview, ReadingStatus,
    StatsService, StatusCount,
};

fn add(service: &BookService<'_>, title: &str, isbn: &str, genre: Option<&str>) -> i64 {
    service
        .add_book(&NewBook::new(title, "Some Author", isbn).with_genre(genre))
        .unwrap()
        .id
}

fn review(service: &BookService<'_>, book_id: i64, rating: f64) {
    service
        .add_review(&NewReview::new(book_id, rating, None))
        .unwrap();
}

#[test]
fn status_counts_include_zero_buckets() {
    let db = Database::open_in_memory().unwrap();
    let books = BookService::new(&db);
    let stats = StatsService::new(&db);

    let empty = stats.statistics().unwrap();
    assert_eq!(empty.total_books, 0);
    assert_eq!(empty.total_reviews, 0);
    assert_eq!(
        empty.books_by_status,
        ReadingStatus::ALL
            .into_iter()
            .map(|status| StatusCount { status, count: 0 })
            .collect::<Vec<_>>()
    );

    add(&books, "A", "isbn-a", None);
    let b = add(&books, "B", "isbn-b", None);
    books
        .update_book(
            b,
            &BookPatch {
                status: Some(ReadingStatus::Completed),
                ..BookPatch::default()
            },
        )
        .unwrap();

    let snapshot = stats.statistics().unwrap();
    assert_eq!(snapshot.total_books, 2);
    assert_eq!(
        snapshot.books_by_status,
        vec![
            StatusCount {
                status: ReadingStatus::ToRead,
                count: 1
            },
            StatusCount {
                status: ReadingStatus::Reading,
                count: 0
            },
            StatusCount {
                status: ReadingStatus::Completed,
                count: 1
            },
        ]
    );
}

#[test]
fn genre_averages_are_rounded_and_default_to_zero() {
    let db = Database::open_in_memory().unwrap();
    let books = BookService::new(&db);
    GenreService::new(&db).add_genre("Poetry").unwrap();

    let dune = add(&books, "Dune", "isbn-dune", Some("Science Fiction"));
    let hyperion = add(&books, "Hyperion", "isbn-hyp", Some("Science Fiction"));
    add(&books, "Gone Girl", "isbn-gone", Some("Mystery"));
    review(&books, dune, 5.0);
    review(&books, dune, 4.0);
    review(&books, hyperion, 4.0);

    let genres = StatsService::new(&db).statistics().unwrap().genres;
    let names: Vec<_> = genres.iter().map(|summary| summary.genre.name.as_str()).collect();
    assert_eq!(names, vec!["Mystery", "Poetry", "Science Fiction"]);

    let mystery = &genres[0];
    assert_eq!(mystery.book_count, 1);
    assert_eq!(mystery.average_rating, 0.0);

    let poetry = &genres[1];
    assert_eq!(poetry.book_count, 0);
    assert_eq!(poetry.average_rating, 0.0);

    let science_fiction = &genres[2];
    assert_eq!(science_fiction.book_count, 2);
    assert_eq!(science_fiction.average_rating, 4.33);
}

#[test]
fn top_rated_excludes_unreviewed_books_and_sorts_descending() {
    let db = Database::open_in_memory().unwrap();
    let books = BookService::new(&db);

    let a = add(&books, "A", "isbn-a", None);
    let b = add(&books, "B", "isbn-b", None);
    let c = add(&books, "C", "isbn-c", None);
    add(&books, "D", "isbn-d", None);
    add(&books, "E", "isbn-e", None);
    review(&books, a, 3.0);
    review(&books, b, 5.0);
    review(&books, b, 4.0);
    review(&books, c, 4.9);

    let ranking = StatsService::new(&db).top_rated_books(Some(5)).unwrap();
    let ids: Vec<_> = ranking.iter().map(|entry| entry.book_id).collect();
    assert_eq!(ids, vec![c, b, a]);
    assert_eq!(ranking[1].average_rating, 4.5);
    assert_eq!(ranking[1].review_count, 2);
    assert_eq!(ranking[1].title, "B");
    assert_eq!(ranking[1].author, "Some Author");
}

#[test]
fn top_rated_respects_limit_and_breaks_ties_by_id() {
    let db = Database::open_in_memory().unwrap();
    let books = BookService::new(&db);
    let mut ids = Vec::new();
    for index in 0..7 {
        let id = add(&books, &format!("Book {index}"), &format!("isbn-{index}"), None);
        review(&books, id, 4.0);
        ids.push(id);
    }

    let stats = StatsService::new(&db);
    let default_ranking = stats.top_rated_books(None).unwrap();
    assert_eq!(default_ranking.len(), 5);
    let ranked: Vec<_> = default_ranking.iter().map(|entry| entry.book_id).collect();
    assert_eq!(ranked, ids[..5].to_vec());

    assert!(stats.top_rated_books(Some(0)).unwrap().is_empty());
    assert_eq!(stats.top_rated_books(Some(2)).unwrap().len(), 2);
}
