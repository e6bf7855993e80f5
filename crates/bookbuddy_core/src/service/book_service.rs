//! Book use-case service.
//!
//! # Responsibility
//! - Provide one entry point per user action on books and their reviews.
//! - Run each action as its own unit of work through [`Database`].
//!
//! # Invariants
//! - Input is validated before any unit of work is opened.
//! - A failed action leaves the store exactly as it was.
//! - Delete only proceeds after the caller's confirmation accepts the book.

use crate::db::Database;
use crate::model::book::{Book, BookDetails, BookId, BookPatch, NewBook};
use crate::model::review::{NewReview, Review};
use crate::repo::book_repo::{BookRepository, SqliteBookRepository};
use crate::repo::error::{Missing, RepoError, RepoResult};
use crate::repo::genre_repo::{GenreRepository, SqliteGenreRepository};
use crate::repo::review_repo::{ReviewRepository, SqliteReviewRepository};
use log::info;

/// Result of a delete request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The book and `reviews_removed` reviews are gone.
    Deleted { book: Book, reviews_removed: usize },
    /// The confirmation declined; nothing changed.
    Declined { book: Book },
}

/// Use-case service for books and reviews.
pub struct BookService<'db> {
    db: &'db Database,
}

impl<'db> BookService<'db> {
    pub fn new(db: &'db Database) -> Self {
        Self { db }
    }

    /// Adds a book, creating its genre on first use.
    ///
    /// # Errors
    /// - `Validation` for empty required fields, before touching storage.
    /// - `Constraint` when the ISBN already exists; a genre created for this
    ///   book is rolled back along with it.
    pub fn add_book(&self, new_book: &NewBook) -> RepoResult<Book> {
        new_book.validate()?;

        let book = self.db.write("add_book", |tx| -> RepoResult<Book> {
            let genre_id = match new_book.genre.as_deref() {
                Some(name) => Some(SqliteGenreRepository::new(tx).find_or_create_genre(name)?.id),
                None => None,
            };
            SqliteBookRepository::new(tx).insert_book(new_book, genre_id)
        })?;

        info!(
            "event=book_add module=service status=ok book_id={} has_genre={}",
            book.id,
            book.genre_id.is_some()
        );
        Ok(book)
    }

    /// Lists every book ordered by id.
    pub fn list_books(&self) -> RepoResult<Vec<Book>> {
        self.db
            .read("list_books", |conn| SqliteBookRepository::new(conn).list_books())
    }

    /// Finds books whose title, author or ISBN contains `term`, ignoring case.
    ///
    /// Surrounding whitespace in `term` is ignored; an empty term matches all.
    pub fn search_books(&self, term: &str) -> RepoResult<Vec<Book>> {
        let term = term.trim();
        self.db.read("search_books", |conn| {
            SqliteBookRepository::new(conn).search_books(term)
        })
    }

    /// Gets one book or `NotFound`.
    pub fn get_book(&self, id: BookId) -> RepoResult<Book> {
        self.db.read("get_book", |conn| {
            SqliteBookRepository::new(conn)
                .get_book(id)?
                .ok_or(RepoError::NotFound(Missing::Book(id)))
        })
    }

    /// Gets a book with its genre and reviews for display.
    pub fn get_book_details(&self, id: BookId) -> RepoResult<BookDetails> {
        self.db.read("get_book_details", |conn| {
            let book = SqliteBookRepository::new(conn)
                .get_book(id)?
                .ok_or(RepoError::NotFound(Missing::Book(id)))?;
            let genre = match book.genre_id {
                Some(genre_id) => SqliteGenreRepository::new(conn).get_genre(genre_id)?,
                None => None,
            };
            let reviews = SqliteReviewRepository::new(conn).list_reviews_for_book(id)?;
            Ok(BookDetails {
                book,
                genre,
                reviews,
            })
        })
    }

    /// Applies `patch` to an existing book and refreshes `updated_at`.
    ///
    /// # Errors
    /// - `Validation` when any supplied field is invalid; nothing is applied.
    /// - `NotFound` when `id` does not exist.
    /// - `Constraint` when the new ISBN belongs to another book.
    pub fn update_book(&self, id: BookId, patch: &BookPatch) -> RepoResult<Book> {
        patch.validate()?;

        let book = self.db.write("update_book", |tx| -> RepoResult<Book> {
            let books = SqliteBookRepository::new(tx);
            let mut book = books
                .get_book(id)?
                .ok_or(RepoError::NotFound(Missing::Book(id)))?;

            patch.apply_to(&mut book);
            if let Some(name) = patch.genre.as_deref() {
                book.genre_id = Some(SqliteGenreRepository::new(tx).find_or_create_genre(name)?.id);
            }

            books.update_book(&book)
        })?;

        info!(
            "event=book_update module=service status=ok book_id={}",
            book.id
        );
        Ok(book)
    }

    /// Deletes a book and its reviews once `confirm` accepts it.
    ///
    /// `confirm` sees the stored book and runs inside the unit of work; when
    /// it returns `false` the book is left untouched.
    pub fn delete_book(
        &self,
        id: BookId,
        confirm: impl FnOnce(&Book) -> bool,
    ) -> RepoResult<DeleteOutcome> {
        let outcome = self.db.write("delete_book", |tx| -> RepoResult<DeleteOutcome> {
            let books = SqliteBookRepository::new(tx);
            let book = books
                .get_book(id)?
                .ok_or(RepoError::NotFound(Missing::Book(id)))?;

            if !confirm(&book) {
                return Ok(DeleteOutcome::Declined { book });
            }

            let reviews_removed = books.delete_book(id)?;
            Ok(DeleteOutcome::Deleted {
                book,
                reviews_removed,
            })
        })?;

        match &outcome {
            DeleteOutcome::Deleted {
                book,
                reviews_removed,
            } => info!(
                "event=book_delete module=service status=ok book_id={} reviews_removed={}",
                book.id, reviews_removed
            ),
            DeleteOutcome::Declined { book } => info!(
                "event=book_delete module=service status=declined book_id={}",
                book.id
            ),
        }
        Ok(outcome)
    }

    /// Adds a review stamped with today's local date.
    pub fn add_review(&self, review: &NewReview) -> RepoResult<Review> {
        review.validate()?;
        let date_added = chrono::Local::now().format("%Y-%m-%d").to_string();

        let stored = self.db.write("add_review", |tx| -> RepoResult<Review> {
            if SqliteBookRepository::new(tx)
                .get_book(review.book_id)?
                .is_none()
            {
                return Err(RepoError::NotFound(Missing::Book(review.book_id)));
            }
            SqliteReviewRepository::new(tx).insert_review(review, &date_added)
        })?;

        info!(
            "event=review_add module=service status=ok book_id={} review_id={}",
            stored.book_id, stored.id
        );
        Ok(stored)
    }

    /// Lists the reviews of one book, or `NotFound` when the book is absent.
    pub fn list_reviews(&self, book_id: BookId) -> RepoResult<Vec<Review>> {
        self.db.read("list_reviews", |conn| {
            if SqliteBookRepository::new(conn).get_book(book_id)?.is_none() {
                return Err(RepoError::NotFound(Missing::Book(book_id)));
            }
            SqliteReviewRepository::new(conn).list_reviews_for_book(book_id)
        })
    }
}
