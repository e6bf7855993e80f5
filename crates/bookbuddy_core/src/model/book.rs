//! Book domain model.
//!
//! # Responsibility
//! - Define the stored book record and its reading status.
//! - Define write-side inputs (`NewBook`, `BookPatch`) with their validation.
//!
//! # Invariants
//! - `title`, `author` and `isbn` are non-empty after trimming.
//! - `publication_year`, when set, is positive.
//! - `updated_at >= created_at`; both are Unix epoch milliseconds.

use crate::model::genre::{Genre, GenreId};
use crate::model::review::Review;
use crate::model::validation::{require_text, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Storage-assigned book identifier.
pub type BookId = i64;

/// Reading progress for a book.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingStatus {
    /// On the shelf, not started.
    #[default]
    ToRead,
    /// Currently being read.
    Reading,
    /// Finished.
    Completed,
}

impl ReadingStatus {
    /// Every status, in display order.
    pub const ALL: [ReadingStatus; 3] = [Self::ToRead, Self::Reading, Self::Completed];

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::ToRead => "To Read",
            Self::Reading => "Reading",
            Self::Completed => "Completed",
        }
    }
}

impl Display for ReadingStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ReadingStatus {
    type Err = ValidationError;

    /// Accepts labels and storage names alike: `To Read`, `to-read`, `to_read`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value
            .trim()
            .to_ascii_lowercase()
            .replace([' ', '-'], "_");
        match normalized.as_str() {
            "to_read" | "toread" => Ok(Self::ToRead),
            "reading" => Ok(Self::Reading),
            "completed" | "done" => Ok(Self::Completed),
            _ => Err(ValidationError::UnknownStatus(value.trim().to_string())),
        }
    }
}

/// Stored book record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub status: ReadingStatus,
    pub genre_id: Option<GenreId>,
    pub publication_year: Option<i32>,
    /// Unique across all books.
    pub isbn: String,
    /// Unix epoch milliseconds, set once at insert.
    pub created_at: i64,
    /// Unix epoch milliseconds, refreshed on every mutation.
    pub updated_at: i64,
}

/// Input for the add-book operation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub publication_year: Option<i32>,
    /// Genre name; created on first use.
    pub genre: Option<String>,
    pub status: ReadingStatus,
}

impl NewBook {
    /// Creates an input with trimmed text fields, no genre and `ToRead` status.
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        isbn: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into().trim().to_string(),
            author: author.into().trim().to_string(),
            isbn: isbn.into().trim().to_string(),
            ..Self::default()
        }
    }

    pub fn with_publication_year(mut self, year: Option<i32>) -> Self {
        self.publication_year = year;
        self
    }

    /// Blank names are treated as "no genre".
    pub fn with_genre(mut self, genre: Option<&str>) -> Self {
        self.genre = genre
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        self
    }

    pub fn with_status(mut self, status: ReadingStatus) -> Self {
        self.status = status;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)?;
        require_text("author", &self.author)?;
        require_text("isbn", &self.isbn)?;
        validate_year(self.publication_year)?;
        if let Some(genre) = &self.genre {
            require_text("genre name", genre)?;
        }
        Ok(())
    }
}

/// Partial update for an existing book. `None` keeps the current value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub publication_year: Option<i32>,
    pub status: Option<ReadingStatus>,
    pub genre: Option<String>,
}

impl BookPatch {
    /// Returns whether the patch changes no field.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.isbn.is_none()
            && self.publication_year.is_none()
            && self.status.is_none()
            && self.genre.is_none()
    }

    /// Validates every supplied field. A patch is applied whole or not at all.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(title) = &self.title {
            require_text("title", title)?;
        }
        if let Some(author) = &self.author {
            require_text("author", author)?;
        }
        if let Some(isbn) = &self.isbn {
            require_text("isbn", isbn)?;
        }
        if let Some(genre) = &self.genre {
            require_text("genre name", genre)?;
        }
        validate_year(self.publication_year)
    }

    /// Copies supplied scalar fields onto `book`. Genre is resolved by the caller.
    pub fn apply_to(&self, book: &mut Book) {
        if let Some(title) = &self.title {
            book.title = title.trim().to_string();
        }
        if let Some(author) = &self.author {
            book.author = author.trim().to_string();
        }
        if let Some(isbn) = &self.isbn {
            book.isbn = isbn.trim().to_string();
        }
        if let Some(year) = self.publication_year {
            book.publication_year = Some(year);
        }
        if let Some(status) = self.status {
            book.status = status;
        }
    }
}

/// Full read model for the view-details operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookDetails {
    pub book: Book,
    pub genre: Option<Genre>,
    pub reviews: Vec<Review>,
}

fn validate_year(year: Option<i32>) -> Result<(), ValidationError> {
    match year {
        Some(year) if year <= 0 => Err(ValidationError::NonPositiveYear(i64::from(year))),
        _ => Ok(()),
    }
}
