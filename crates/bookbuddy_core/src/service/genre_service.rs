//! Genre use-case service.

use crate::db::Database;
use crate::model::genre::{normalize_genre_name, Genre, GenreId};
use crate::repo::error::RepoResult;
use crate::repo::genre_repo::{GenreRemoval, GenreRepository, SqliteGenreRepository};
use log::info;

/// Use-case service for genres.
pub struct GenreService<'db> {
    db: &'db Database,
}

impl<'db> GenreService<'db> {
    pub fn new(db: &'db Database) -> Self {
        Self { db }
    }

    /// Lists genres sorted by name.
    pub fn list_genres(&self) -> RepoResult<Vec<Genre>> {
        self.db
            .read("list_genres", |conn| SqliteGenreRepository::new(conn).list_genres())
    }

    /// Creates a genre. A duplicate name fails with `Constraint`.
    pub fn add_genre(&self, name: &str) -> RepoResult<Genre> {
        let name = normalize_genre_name(name)?;
        let genre = self
            .db
            .write("add_genre", |tx| SqliteGenreRepository::new(tx).insert_genre(&name))?;
        info!(
            "event=genre_add module=service status=ok genre_id={}",
            genre.id
        );
        Ok(genre)
    }

    /// Deletes a genre together with its books and their reviews.
    pub fn delete_genre(&self, id: GenreId) -> RepoResult<GenreRemoval> {
        let removal = self
            .db
            .write("delete_genre", |tx| SqliteGenreRepository::new(tx).delete_genre(id))?;
        info!(
            "event=genre_delete module=service status=ok genre_id={} books_removed={} reviews_removed={}",
            id, removal.books_removed, removal.reviews_removed
        );
        Ok(removal)
    }
}
