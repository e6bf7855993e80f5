//! Review domain model.
//!
//! # Invariants
//! - A review always belongs to exactly one book.
//! - `rating` is finite and within `0.0..=5.0`.
//! - `date_added` is a free-form `YYYY-MM-DD` stamp, not a parsed date.

use crate::model::book::BookId;
use crate::model::validation::{validate_rating, ValidationError};
use serde::{Deserialize, Serialize};

/// Storage-assigned review identifier.
pub type ReviewId = i64;

/// Stored review record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub book_id: BookId,
    pub rating: f64,
    pub comment: Option<String>,
    pub date_added: String,
}

/// Input for the add-review operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReview {
    pub book_id: BookId,
    pub rating: f64,
    pub comment: Option<String>,
}

impl NewReview {
    /// Blank comments are stored as `None`.
    pub fn new(book_id: BookId, rating: f64, comment: Option<&str>) -> Self {
        Self {
            book_id,
            rating,
            comment: comment
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(str::to_string),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_rating(self.rating)
    }
}
