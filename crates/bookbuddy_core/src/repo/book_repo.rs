//! Book repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and search APIs over the `books` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `validate()` on their input before SQL mutations.
//! - `updated_at` never moves backwards.
//! - Deleting a book removes its reviews in the same unit of work.
//! - List and search results are ordered by `id ASC`.

use crate::model::book::{Book, BookId, NewBook, ReadingStatus};
use crate::model::genre::GenreId;
use crate::repo::error::{Missing, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const BOOK_SELECT_SQL: &str = "SELECT
    id,
    title,
    author,
    status,
    genre_id,
    publication_year,
    isbn,
    created_at,
    updated_at
FROM books";

/// Current time in epoch milliseconds, evaluated by SQLite.
const NOW_EPOCH_MS_SQL: &str = "(CAST(strftime('%s', 'now') AS INTEGER) * 1000
    + CAST(substr(strftime('%f', 'now'), 4) AS INTEGER))";

/// Repository interface for book persistence.
pub trait BookRepository {
    /// Inserts one book bound to an already resolved genre and returns it.
    fn insert_book(&self, book: &NewBook, genre_id: Option<GenreId>) -> RepoResult<Book>;
    fn get_book(&self, id: BookId) -> RepoResult<Option<Book>>;
    fn list_books(&self) -> RepoResult<Vec<Book>>;
    /// Case-insensitive substring match over title, author and ISBN.
    fn search_books(&self, term: &str) -> RepoResult<Vec<Book>>;
    /// Persists every mutable field of `book` and returns the stored row.
    fn update_book(&self, book: &Book) -> RepoResult<Book>;
    /// Deletes a book and its reviews; returns how many reviews were removed.
    fn delete_book(&self, id: BookId) -> RepoResult<usize>;
    fn count_books(&self) -> RepoResult<u64>;
}

/// SQLite-backed book repository.
///
/// Borrows the connection (or transaction) of the current unit of work.
pub struct SqliteBookRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBookRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn require_book(&self, id: BookId) -> RepoResult<Book> {
        self.get_book(id)?
            .ok_or(RepoError::NotFound(Missing::Book(id)))
    }
}

impl BookRepository for SqliteBookRepository<'_> {
    fn insert_book(&self, book: &NewBook, genre_id: Option<GenreId>) -> RepoResult<Book> {
        book.validate()?;

        self.conn.execute(
            "INSERT INTO books (
                title,
                author,
                status,
                genre_id,
                publication_year,
                isbn
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                book.title.as_str(),
                book.author.as_str(),
                status_to_db(book.status),
                genre_id,
                book.publication_year,
                book.isbn.as_str(),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        self.get_book(id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("inserted book {id} missing on read-back"))
        })
    }

    fn get_book(&self, id: BookId) -> RepoResult<Option<Book>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BOOK_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_book_row(row)?));
        }

        Ok(None)
    }

    fn list_books(&self) -> RepoResult<Vec<Book>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BOOK_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut books = Vec::new();

        while let Some(row) = rows.next()? {
            books.push(parse_book_row(row)?);
        }

        Ok(books)
    }

    fn search_books(&self, term: &str) -> RepoResult<Vec<Book>> {
        let pattern = format!("%{}%", escape_like(term));
        let mut stmt = self.conn.prepare(&format!(
            "{BOOK_SELECT_SQL}
             WHERE title LIKE ?1 ESCAPE '\\'
                OR author LIKE ?1 ESCAPE '\\'
                OR isbn LIKE ?1 ESCAPE '\\'
             ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query([pattern.as_str()])?;
        let mut books = Vec::new();

        while let Some(row) = rows.next()? {
            books.push(parse_book_row(row)?);
        }

        Ok(books)
    }

    fn update_book(&self, book: &Book) -> RepoResult<Book> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE books
                 SET
                    title = ?1,
                    author = ?2,
                    status = ?3,
                    genre_id = ?4,
                    publication_year = ?5,
                    isbn = ?6,
                    updated_at = MAX(updated_at, {NOW_EPOCH_MS_SQL})
                 WHERE id = ?7;"
            ),
            params![
                book.title.as_str(),
                book.author.as_str(),
                status_to_db(book.status),
                book.genre_id,
                book.publication_year,
                book.isbn.as_str(),
                book.id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(Missing::Book(book.id)));
        }

        self.require_book(book.id)
    }

    fn delete_book(&self, id: BookId) -> RepoResult<usize> {
        let reviews_removed = self
            .conn
            .execute("DELETE FROM reviews WHERE book_id = ?1;", [id])?;
        let changed = self.conn.execute("DELETE FROM books WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(Missing::Book(id)));
        }

        Ok(reviews_removed)
    }

    fn count_books(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM books;", [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

pub(crate) fn parse_book_row(row: &Row<'_>) -> RepoResult<Book> {
    let status_text: String = row.get("status")?;
    let status = parse_status(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in books.status"))
    })?;

    Ok(Book {
        id: row.get("id")?,
        title: row.get("title")?,
        author: row.get("author")?,
        status,
        genre_id: row.get("genre_id")?,
        publication_year: row.get("publication_year")?,
        isbn: row.get("isbn")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub(crate) fn status_to_db(status: ReadingStatus) -> &'static str {
    match status {
        ReadingStatus::ToRead => "to_read",
        ReadingStatus::Reading => "reading",
        ReadingStatus::Completed => "completed",
    }
}

pub(crate) fn parse_status(value: &str) -> Option<ReadingStatus> {
    match value {
        "to_read" => Some(ReadingStatus::ToRead),
        "reading" => Some(ReadingStatus::Reading),
        "completed" => Some(ReadingStatus::Completed),
        _ => None,
    }
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
