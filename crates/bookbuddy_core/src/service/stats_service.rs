//! Collection statistics service.
//!
//! # Invariants
//! - Every statistics snapshot is read in one read transaction, so its parts
//!   agree.

use crate::db::Database;
use crate::repo::book_repo::{BookRepository, SqliteBookRepository};
use crate::repo::error::RepoResult;
use crate::repo::review_repo::{ReviewRepository, SqliteReviewRepository};
use crate::repo::stats_repo::{
    GenreSummary, SqliteStatsRepository, StatsRepository, StatusCount, TopRatedBook,
};
use serde::{Deserialize, Serialize};

/// Number of entries returned by the top-rated ranking by default.
pub const DEFAULT_TOP_RATED_LIMIT: u32 = 5;

/// Snapshot of collection-wide statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryStatistics {
    pub total_books: u64,
    pub total_reviews: u64,
    /// One entry per reading status, in display order.
    pub books_by_status: Vec<StatusCount>,
    /// One entry per genre, sorted by name.
    pub genres: Vec<GenreSummary>,
}

/// Read-only statistics service.
pub struct StatsService<'db> {
    db: &'db Database,
}

impl<'db> StatsService<'db> {
    pub fn new(db: &'db Database) -> Self {
        Self { db }
    }

    pub fn statistics(&self) -> RepoResult<LibraryStatistics> {
        self.db.read("statistics", |conn| {
            let stats = SqliteStatsRepository::new(conn);
            Ok(LibraryStatistics {
                total_books: SqliteBookRepository::new(conn).count_books()?,
                total_reviews: SqliteReviewRepository::new(conn).count_reviews()?,
                books_by_status: stats.count_books_by_status()?,
                genres: stats.genre_summaries()?,
            })
        })
    }

    /// Ranks reviewed books by mean rating; `None` uses
    /// [`DEFAULT_TOP_RATED_LIMIT`].
    pub fn top_rated_books(&self, limit: Option<u32>) -> RepoResult<Vec<TopRatedBook>> {
        let limit = limit.unwrap_or(DEFAULT_TOP_RATED_LIMIT);
        self.db.read("top_rated_books", |conn| {
            SqliteStatsRepository::new(conn).top_rated_books(limit)
        })
    }
}
