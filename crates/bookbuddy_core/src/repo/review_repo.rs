//! Review repository contract and SQLite implementation.

use crate::model::book::BookId;
use crate::model::review::{NewReview, Review};
use crate::repo::error::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

/// Repository interface for review persistence.
///
/// Reviews are append-only: there is no update or single-review delete.
pub trait ReviewRepository {
    /// Inserts a review stamped with `date_added` and returns it.
    fn insert_review(&self, review: &NewReview, date_added: &str) -> RepoResult<Review>;
    /// Reviews of one book, oldest first.
    fn list_reviews_for_book(&self, book_id: BookId) -> RepoResult<Vec<Review>>;
    fn count_reviews(&self) -> RepoResult<u64>;
}

/// SQLite-backed review repository.
pub struct SqliteReviewRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteReviewRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ReviewRepository for SqliteReviewRepository<'_> {
    fn insert_review(&self, review: &NewReview, date_added: &str) -> RepoResult<Review> {
        review.validate()?;

        self.conn.execute(
            "INSERT INTO reviews (book_id, rating, comment, date_added)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                review.book_id,
                review.rating,
                review.comment.as_deref(),
                date_added,
            ],
        )?;

        Ok(Review {
            id: self.conn.last_insert_rowid(),
            book_id: review.book_id,
            rating: review.rating,
            comment: review.comment.clone(),
            date_added: date_added.to_string(),
        })
    }

    fn list_reviews_for_book(&self, book_id: BookId) -> RepoResult<Vec<Review>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, book_id, rating, comment, date_added
             FROM reviews
             WHERE book_id = ?1
             ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([book_id])?;
        let mut reviews = Vec::new();

        while let Some(row) = rows.next()? {
            reviews.push(parse_review_row(row)?);
        }

        Ok(reviews)
    }

    fn count_reviews(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM reviews;", [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

fn parse_review_row(row: &Row<'_>) -> RepoResult<Review> {
    let rating: f64 = row.get("rating")?;
    if !rating.is_finite() {
        return Err(RepoError::InvalidData(format!(
            "invalid rating `{rating}` in reviews.rating"
        )));
    }

    Ok(Review {
        id: row.get("id")?,
        book_id: row.get("book_id")?,
        rating,
        comment: row.get("comment")?,
        date_added: row.get("date_added")?,
    })
}
