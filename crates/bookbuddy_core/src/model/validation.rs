//! Input validation shared by all record types.
//!
//! Parsing helpers here run before any storage access, so a rejected input
//! never opens a unit of work.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Highest accepted review rating.
pub const MAX_RATING: f64 = 5.0;

/// Reasons user input is rejected before persistence.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A required text field is empty after trimming.
    EmptyField(&'static str),
    /// Numeric input could not be parsed.
    MalformedNumber { field: &'static str, input: String },
    /// Publication year must be a positive integer.
    NonPositiveYear(i64),
    /// Rating must be finite and within `0.0..=5.0`.
    RatingOutOfRange(f64),
    /// Status text does not name a known reading status.
    UnknownStatus(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "{field} must not be empty"),
            Self::MalformedNumber { field, input } => {
                write!(f, "invalid {field} `{input}`: expected a number")
            }
            Self::NonPositiveYear(year) => {
                write!(f, "invalid publication year {year}: must be positive")
            }
            Self::RatingOutOfRange(rating) => {
                write!(f, "invalid rating {rating}: must be between 0 and {MAX_RATING}")
            }
            Self::UnknownStatus(value) => write!(
                f,
                "unknown reading status `{value}`; expected to-read|reading|completed"
            ),
        }
    }
}

impl Error for ValidationError {}

/// Parses optional publication-year input.
///
/// Blank input means "no year". Anything else must be a positive integer.
pub fn parse_publication_year(input: &str) -> Result<Option<i32>, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let malformed = || ValidationError::MalformedNumber {
        field: "publication year",
        input: trimmed.to_string(),
    };
    let year = trimmed.parse::<i64>().map_err(|_| malformed())?;
    if year <= 0 {
        return Err(ValidationError::NonPositiveYear(year));
    }
    let year = i32::try_from(year).map_err(|_| malformed())?;
    Ok(Some(year))
}

/// Parses rating input such as `4` or `4.5`.
pub fn parse_rating(input: &str) -> Result<f64, ValidationError> {
    let trimmed = input.trim();
    let rating = trimmed
        .parse::<f64>()
        .map_err(|_| ValidationError::MalformedNumber {
            field: "rating",
            input: trimmed.to_string(),
        })?;
    validate_rating(rating)?;
    Ok(rating)
}

pub fn validate_rating(rating: f64) -> Result<(), ValidationError> {
    if rating.is_finite() && (0.0..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(ValidationError::RatingOutOfRange(rating))
    }
}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(())
}
