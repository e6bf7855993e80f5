//! Repository error taxonomy.

use crate::db::{DbError, UnitOfWorkError};
use crate::model::book::BookId;
use crate::model::genre::GenreId;
use crate::model::validation::ValidationError;
use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Record that a lookup by id failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    Book(BookId),
    Genre(GenreId),
}

impl Display for Missing {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Book(id) => write!(f, "book {id}"),
            Self::Genre(id) => write!(f, "genre {id}"),
        }
    }
}

/// Error for every book/genre/review persistence and query operation.
#[derive(Debug)]
pub enum RepoError {
    /// Input rejected before persistence.
    Validation(ValidationError),
    /// Lookup by identifier found nothing.
    NotFound(Missing),
    /// Storage constraint rejected the write (duplicate ISBN, duplicate genre).
    Constraint(String),
    /// Any other storage failure.
    Db(DbError),
    /// A stored row could not be decoded.
    InvalidData(String),
}

impl RepoError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(missing) => write!(f, "{missing} not found"),
            Self::Constraint(message) => write!(f, "constraint violation: {message}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid stored data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::Constraint(_) | Self::InvalidData(_) => None,
        }
    }
}

impl UnitOfWorkError for RepoError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::NotFound(_) => "not_found",
            Self::Constraint(_) => "constraint_violation",
            Self::Db(err) => err.error_code(),
            Self::InvalidData(_) => "invalid_data",
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Sqlite(err) => Self::from(err),
            other => Self::Db(other),
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(failure, message) = &value {
            if failure.code == ErrorCode::ConstraintViolation {
                return Self::Constraint(message.clone().unwrap_or_else(|| failure.to_string()));
            }
        }
        Self::Db(DbError::Sqlite(value))
    }
}
