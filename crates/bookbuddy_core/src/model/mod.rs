//! Book collection domain model.
//!
//! # Responsibility
//! - Define the records stored by core: books, genres and reviews.
//! - Validate user input before it reaches the persistence gateway.
//!
//! # Invariants
//! - Every record is identified by a storage-assigned integer id.
//! - A genre owns its books; a book owns its reviews.

pub mod book;
pub mod genre;
pub mod review;
pub mod validation;
