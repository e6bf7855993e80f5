//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repositories borrow the connection of the caller's unit of work; they
//!   never open, commit or roll back on their own.
//! - Write paths validate their input before SQL mutations.
//! - Repository APIs return semantic errors (`NotFound`, `Constraint`) in
//!   addition to DB transport errors.

pub mod book_repo;
pub mod error;
pub mod genre_repo;
pub mod review_repo;
pub mod stats_repo;
