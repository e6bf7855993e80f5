//! Plain-text rendering for shell output.
//!
//! Every function returns a `String` so the shell decides where it goes.

use std::fmt::Write;

use bookbuddy_core::{Book, BookDetails, Genre, LibraryStatistics, TopRatedBook};
use chrono::{DateTime, Utc};

const SEPARATOR_WIDTH: usize = 30;

pub fn separator() -> String {
    "-".repeat(SEPARATOR_WIDTH)
}

/// Short listing block used by list and search.
pub fn book_summary(book: &Book) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "ID: {}", book.id);
    let _ = writeln!(out, "Title: {}", book.title);
    let _ = writeln!(out, "Author: {}", book.author);
    let _ = writeln!(out, "ISBN: {}", book.isbn);
    if let Some(year) = book.publication_year {
        let _ = writeln!(out, "Publication Year: {year}");
    }
    let _ = writeln!(out, "Status: {}", book.status);
    out.push_str(&separator());
    out
}

pub fn book_details(details: &BookDetails) -> String {
    let book = &details.book;
    let mut out = String::new();
    let _ = writeln!(out, "ID: {}", book.id);
    let _ = writeln!(out, "Title: {}", book.title);
    let _ = writeln!(out, "Author: {}", book.author);
    let _ = writeln!(out, "ISBN: {}", book.isbn);
    let _ = writeln!(
        out,
        "Publication Year: {}",
        book.publication_year
            .map(|year| year.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    let _ = writeln!(
        out,
        "Genre: {}",
        details
            .genre
            .as_ref()
            .map(|genre| genre.name.as_str())
            .unwrap_or("-")
    );
    let _ = writeln!(out, "Status: {}", book.status);
    let _ = writeln!(out, "Created At: {}", format_timestamp(book.created_at));
    let _ = writeln!(out, "Updated At: {}", format_timestamp(book.updated_at));

    if details.reviews.is_empty() {
        out.push_str("Reviews: none");
        return out;
    }
    let _ = write!(out, "Reviews ({}):", details.reviews.len());
    for review in &details.reviews {
        let _ = write!(
            out,
            "\n  [{}] {:.2}/5",
            review.date_added, review.rating
        );
        if let Some(comment) = &review.comment {
            let _ = write!(out, " {comment}");
        }
    }
    out
}

pub fn statistics(stats: &LibraryStatistics) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total books: {}", stats.total_books);
    let _ = writeln!(out, "Total reviews: {}", stats.total_reviews);
    out.push_str("\nBooks by status:");
    for entry in &stats.books_by_status {
        let _ = write!(out, "\n  {}: {}", entry.status, entry.count);
    }
    out.push_str("\n\nGenres:");
    if stats.genres.is_empty() {
        out.push_str("\n  none");
    }
    for summary in &stats.genres {
        let _ = write!(
            out,
            "\n  {}: {} book(s), average rating {:.2}",
            summary.genre.name, summary.book_count, summary.average_rating
        );
    }
    out
}

pub fn top_rated(ranking: &[TopRatedBook]) -> String {
    if ranking.is_empty() {
        return "No reviewed books yet.".to_string();
    }
    ranking
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            format!(
                "{}. {} by {} ({:.2}, {} review(s))",
                index + 1,
                entry.title,
                entry.author,
                entry.average_rating,
                entry.review_count
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn genres(genres: &[Genre]) -> String {
    if genres.is_empty() {
        return "No genres found.".to_string();
    }
    genres
        .iter()
        .map(|genre| format!("{}. {}", genre.id, genre.name))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Formats epoch milliseconds as UTC; out-of-range values print raw.
pub fn format_timestamp(epoch_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(epoch_ms)
        .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| epoch_ms.to_string())
}
