//! Genre repository contract and SQLite implementation.
//!
//! # Invariants
//! - Genre names are unique; lookups match the trimmed name exactly.
//! - `find_or_create_genre` looks up before inserting, so repeated use of one
//!   name never produces a second row.
//! - Deleting a genre removes its books and their reviews in the same unit of
//!   work.

use crate::model::genre::{normalize_genre_name, Genre, GenreId};
use crate::repo::error::{Missing, RepoError, RepoResult};
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

/// Rows removed by a genre delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreRemoval {
    pub books_removed: usize,
    pub reviews_removed: usize,
}

/// Repository interface for genre persistence.
pub trait GenreRepository {
    fn find_genre_by_name(&self, name: &str) -> RepoResult<Option<Genre>>;
    fn get_genre(&self, id: GenreId) -> RepoResult<Option<Genre>>;
    fn insert_genre(&self, name: &str) -> RepoResult<Genre>;
    /// Genres sorted by name.
    fn list_genres(&self) -> RepoResult<Vec<Genre>>;
    fn delete_genre(&self, id: GenreId) -> RepoResult<GenreRemoval>;

    /// Returns the genre with `name`, creating it when absent.
    fn find_or_create_genre(&self, name: &str) -> RepoResult<Genre> {
        let name = normalize_genre_name(name)?;
        if let Some(existing) = self.find_genre_by_name(&name)? {
            return Ok(existing);
        }
        self.insert_genre(&name)
    }
}

/// SQLite-backed genre repository.
pub struct SqliteGenreRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGenreRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl GenreRepository for SqliteGenreRepository<'_> {
    fn find_genre_by_name(&self, name: &str) -> RepoResult<Option<Genre>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM genres WHERE name = ?1;")?;
        let mut rows = stmt.query([name.trim()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_genre_row(row)?));
        }

        Ok(None)
    }

    fn get_genre(&self, id: GenreId) -> RepoResult<Option<Genre>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM genres WHERE id = ?1;")?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_genre_row(row)?));
        }

        Ok(None)
    }

    fn insert_genre(&self, name: &str) -> RepoResult<Genre> {
        let name = normalize_genre_name(name)?;
        self.conn
            .execute("INSERT INTO genres (name) VALUES (?1);", [name.as_str()])?;

        Ok(Genre {
            id: self.conn.last_insert_rowid(),
            name,
        })
    }

    fn list_genres(&self) -> RepoResult<Vec<Genre>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM genres ORDER BY name ASC, id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut genres = Vec::new();

        while let Some(row) = rows.next()? {
            genres.push(parse_genre_row(row)?);
        }

        Ok(genres)
    }

    fn delete_genre(&self, id: GenreId) -> RepoResult<GenreRemoval> {
        let reviews_removed = self.conn.execute(
            "DELETE FROM reviews
             WHERE book_id IN (SELECT id FROM books WHERE genre_id = ?1);",
            [id],
        )?;
        let books_removed = self
            .conn
            .execute("DELETE FROM books WHERE genre_id = ?1;", [id])?;
        let changed = self
            .conn
            .execute("DELETE FROM genres WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(Missing::Genre(id)));
        }

        Ok(GenreRemoval {
            books_removed,
            reviews_removed,
        })
    }
}

fn parse_genre_row(row: &Row<'_>) -> RepoResult<Genre> {
    Ok(Genre {
        id: row.get("id")?,
        name: row.get("name")?,
    })
}
