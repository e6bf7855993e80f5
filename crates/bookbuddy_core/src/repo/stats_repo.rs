//! Aggregate queries over books, genres and reviews.
//!
//! # Invariants
//! - Status counts cover every `ReadingStatus`, zero included.
//! - Every genre appears in genre summaries; unrated genres average `0.0`.
//! - Top-rated rankings only include books with at least one review and are
//!   ordered by mean rating descending, then book id ascending.
//! - Averages are rounded to two decimal places.

use crate::model::book::{BookId, ReadingStatus};
use crate::model::genre::Genre;
use crate::repo::book_repo::parse_status;
use crate::repo::error::{RepoError, RepoResult};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Number of books in one reading status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: ReadingStatus,
    pub count: u64,
}

/// Per-genre book count and mean review rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreSummary {
    pub genre: Genre,
    pub book_count: u64,
    /// Mean rating across reviews of the genre's books, `0.0` when unrated.
    pub average_rating: f64,
}

/// One entry of the top-rated ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopRatedBook {
    pub book_id: BookId,
    pub title: String,
    pub author: String,
    pub average_rating: f64,
    pub review_count: u64,
}

/// Repository interface for aggregate queries.
pub trait StatsRepository {
    fn count_books_by_status(&self) -> RepoResult<Vec<StatusCount>>;
    fn genre_summaries(&self) -> RepoResult<Vec<GenreSummary>>;
    fn top_rated_books(&self, limit: u32) -> RepoResult<Vec<TopRatedBook>>;
}

/// SQLite-backed aggregate queries.
pub struct SqliteStatsRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStatsRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl StatsRepository for SqliteStatsRepository<'_> {
    fn count_books_by_status(&self) -> RepoResult<Vec<StatusCount>> {
        let mut stmt = self
            .conn
            .prepare("SELECT status, COUNT(*) AS total FROM books GROUP BY status;")?;
        let mut rows = stmt.query([])?;
        let mut counts: HashMap<ReadingStatus, u64> = HashMap::new();

        while let Some(row) = rows.next()? {
            let status_text: String = row.get("status")?;
            let status = parse_status(&status_text).ok_or_else(|| {
                RepoError::InvalidData(format!("invalid status `{status_text}` in books.status"))
            })?;
            let total: i64 = row.get("total")?;
            counts.insert(status, to_count(total));
        }

        Ok(ReadingStatus::ALL
            .into_iter()
            .map(|status| StatusCount {
                status,
                count: counts.get(&status).copied().unwrap_or(0),
            })
            .collect())
    }

    fn genre_summaries(&self) -> RepoResult<Vec<GenreSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                genres.id AS id,
                genres.name AS name,
                COUNT(DISTINCT books.id) AS book_count,
                AVG(reviews.rating) AS average_rating
             FROM genres
             LEFT JOIN books ON books.genre_id = genres.id
             LEFT JOIN reviews ON reviews.book_id = books.id
             GROUP BY genres.id
             ORDER BY genres.name ASC, genres.id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut summaries = Vec::new();

        while let Some(row) = rows.next()? {
            let average: Option<f64> = row.get("average_rating")?;
            summaries.push(GenreSummary {
                genre: Genre {
                    id: row.get("id")?,
                    name: row.get("name")?,
                },
                book_count: to_count(row.get("book_count")?),
                average_rating: round_rating(average.unwrap_or(0.0)),
            });
        }

        Ok(summaries)
    }

    fn top_rated_books(&self, limit: u32) -> RepoResult<Vec<TopRatedBook>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(
            "SELECT
                books.id AS id,
                books.title AS title,
                books.author AS author,
                AVG(reviews.rating) AS average_rating,
                COUNT(reviews.id) AS review_count
             FROM books
             JOIN reviews ON reviews.book_id = books.id
             GROUP BY books.id
             ORDER BY average_rating DESC, books.id ASC
             LIMIT ?1;",
        )?;
        let mut rows = stmt.query([i64::from(limit)])?;
        let mut ranking = Vec::new();

        while let Some(row) = rows.next()? {
            let average: f64 = row.get("average_rating")?;
            ranking.push(TopRatedBook {
                book_id: row.get("id")?,
                title: row.get("title")?,
                author: row.get("author")?,
                average_rating: round_rating(average),
                review_count: to_count(row.get("review_count")?),
            });
        }

        Ok(ranking)
    }
}

/// Rounds a mean rating to two decimal places.
pub fn round_rating(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn to_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::round_rating;

    #[test]
    fn ratings_round_to_two_decimals() {
        assert_eq!(round_rating(4.666_666), 4.67);
        assert_eq!(round_rating(3.0), 3.0);
        assert_eq!(round_rating(0.0), 0.0);
        assert_eq!(round_rating(4.125), 4.13);
    }
}
