//! Core domain logic for BookBuddy, a personal book-collection manager.
//! This crate is the single source of truth for collection invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod seed;
pub mod service;

pub use db::{Database, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::book::{Book, BookDetails, BookId, BookPatch, NewBook, ReadingStatus};
pub use model::genre::{Genre, GenreId};
pub use model::review::{NewReview, Review, ReviewId};
pub use model::validation::{parse_publication_year, parse_rating, ValidationError};
pub use repo::error::{Missing, RepoError, RepoResult};
pub use repo::genre_repo::GenreRemoval;
pub use repo::stats_repo::{GenreSummary, StatusCount, TopRatedBook};
pub use seed::{seed_sample_data, SeedOutcome};
pub use service::book_service::{BookService, DeleteOutcome};
pub use service::genre_service::GenreService;
pub use service::stats_service::{LibraryStatistics, StatsService, DEFAULT_TOP_RATED_LIMIT};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
