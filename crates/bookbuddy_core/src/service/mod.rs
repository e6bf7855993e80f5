//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into one unit of work per user action.
//! - Keep the shell decoupled from storage details.

pub mod book_service;
pub mod genre_service;
pub mod stats_service;
