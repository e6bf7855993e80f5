//! Sample collection for first runs.
//!
//! # Invariants
//! - Seeding only happens when the `books` table is empty.
//! - The emptiness check and the inserts share one unit of work, so repeated
//!   runs never duplicate rows.

use crate::db::Database;
use crate::model::book::{NewBook, ReadingStatus};
use crate::model::review::NewReview;
use crate::repo::book_repo::{BookRepository, SqliteBookRepository};
use crate::repo::error::RepoResult;
use crate::repo::genre_repo::{GenreRepository, SqliteGenreRepository};
use crate::repo::review_repo::{ReviewRepository, SqliteReviewRepository};
use log::info;

struct SampleBook {
    title: &'static str,
    author: &'static str,
    isbn: &'static str,
    publication_year: i32,
    genre: &'static str,
    status: ReadingStatus,
    review: Option<SampleReview>,
}

struct SampleReview {
    rating: f64,
    comment: &'static str,
    date_added: &'static str,
}

const SAMPLE_BOOKS: &[SampleBook] = &[
    SampleBook {
        title: "The Great Gatsby",
        author: "F. Scott Fitzgerald",
        isbn: "9780743273565",
        publication_year: 1925,
        genre: "Fiction",
        status: ReadingStatus::Completed,
        review: Some(SampleReview {
            rating: 4.5,
            comment: "A classic masterpiece!",
            date_added: "2024-03-15",
        }),
    },
    SampleBook {
        title: "Dune",
        author: "Frank Herbert",
        isbn: "9780441172719",
        publication_year: 1965,
        genre: "Science Fiction",
        status: ReadingStatus::Reading,
        review: Some(SampleReview {
            rating: 5.0,
            comment: "One of the best sci-fi novels ever written.",
            date_added: "2024-03-14",
        }),
    },
    SampleBook {
        title: "The Da Vinci Code",
        author: "Dan Brown",
        isbn: "9780307474278",
        publication_year: 2003,
        genre: "Mystery",
        status: ReadingStatus::ToRead,
        review: None,
    },
    SampleBook {
        title: "To Kill a Mockingbird",
        author: "Harper Lee",
        isbn: "9780446310789",
        publication_year: 1960,
        genre: "Fiction",
        status: ReadingStatus::ToRead,
        review: None,
    },
    SampleBook {
        title: "1984",
        author: "George Orwell",
        isbn: "9780451524935",
        publication_year: 1949,
        genre: "Science Fiction",
        status: ReadingStatus::ToRead,
        review: None,
    },
    SampleBook {
        title: "Pride and Prejudice",
        author: "Jane Austen",
        isbn: "9780141439518",
        publication_year: 1813,
        genre: "Fiction",
        status: ReadingStatus::ToRead,
        review: None,
    },
    SampleBook {
        title: "The Hobbit",
        author: "J.R.R. Tolkien",
        isbn: "9780547928227",
        publication_year: 1937,
        genre: "Fantasy",
        status: ReadingStatus::ToRead,
        review: None,
    },
];

/// What the seed step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Seeded { books: usize, reviews: usize },
    Skipped { existing_books: u64 },
}

/// Populates an empty store with the sample collection.
pub fn seed_sample_data(db: &Database) -> RepoResult<SeedOutcome> {
    let outcome = db.write("seed_sample_data", |tx| -> RepoResult<SeedOutcome> {
        let books = SqliteBookRepository::new(tx);
        let existing_books = books.count_books()?;
        if existing_books > 0 {
            return Ok(SeedOutcome::Skipped { existing_books });
        }

        let genres = SqliteGenreRepository::new(tx);
        let reviews = SqliteReviewRepository::new(tx);
        let mut review_count = 0;

        for sample in SAMPLE_BOOKS {
            let genre = genres.find_or_create_genre(sample.genre)?;
            let new_book = NewBook::new(sample.title, sample.author, sample.isbn)
                .with_publication_year(Some(sample.publication_year))
                .with_status(sample.status);
            let book = books.insert_book(&new_book, Some(genre.id))?;

            if let Some(review) = &sample.review {
                let new_review = NewReview::new(book.id, review.rating, Some(review.comment));
                reviews.insert_review(&new_review, review.date_added)?;
                review_count += 1;
            }
        }

        Ok(SeedOutcome::Seeded {
            books: SAMPLE_BOOKS.len(),
            reviews: review_count,
        })
    })?;

    match outcome {
        SeedOutcome::Seeded { books, reviews } => info!(
            "event=seed module=seed status=ok books={} reviews={}",
            books, reviews
        ),
        SeedOutcome::Skipped { existing_books } => info!(
            "event=seed module=seed status=skipped existing_books={}",
            existing_books
        ),
    }
    Ok(outcome)
}
