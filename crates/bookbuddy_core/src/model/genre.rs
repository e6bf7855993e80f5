//! Genre domain model.

use crate::model::validation::{require_text, ValidationError};
use serde::{Deserialize, Serialize};

/// Storage-assigned genre identifier.
pub type GenreId = i64;

/// Named grouping that owns zero or more books.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Genre {
    pub id: GenreId,
    /// Unique, trimmed, non-empty.
    pub name: String,
}

/// Trims a genre name and rejects blank input.
pub fn normalize_genre_name(name: &str) -> Result<String, ValidationError> {
    require_text("genre name", name)?;
    Ok(name.trim().to_string())
}
