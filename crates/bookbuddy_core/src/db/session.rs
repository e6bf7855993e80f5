//! Persistence gateway handing out scoped units of work.
//!
//! # Responsibility
//! - Own the storage target (file path or isolated in-memory store).
//! - Open a fresh connection per operation and release it on every path.
//! - Commit write units on success and roll them back on any error.
//!
//! # Invariants
//! - No two operations share a connection.
//! - A failed write leaves previously committed state untouched.
//! - In-memory stores live exactly as long as their `Database` handle.

use super::{open_db, open_shared_memory, DbError, DbResult};
use log::{debug, info, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::time::Instant;
use uuid::Uuid;

/// Error types that can flow out of a unit of work.
///
/// Implementors must absorb gateway failures (`From<DbError>`) and expose a
/// stable, metadata-only code for logging.
pub trait UnitOfWorkError: From<DbError> + Display {
    fn error_code(&self) -> &'static str;
}

impl UnitOfWorkError for DbError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Sqlite(_) => "db_error",
            Self::UnsupportedSchemaVersion { .. } => "unsupported_schema",
        }
    }
}

#[derive(Debug)]
enum Target {
    File(PathBuf),
    SharedMemory(String),
}

/// Handle to one book store.
///
/// The handle holds no open session of its own (except the anchor that keeps
/// an in-memory store alive); every call to [`Database::read`] or
/// [`Database::write`] gets a brand-new connection.
#[derive(Debug)]
pub struct Database {
    target: Target,
    _anchor: Option<Connection>,
}

impl Database {
    /// Targets a database file, creating it and its schema when missing.
    ///
    /// The bootstrap connection is closed before returning.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref().to_path_buf();
        drop(open_db(&path)?);
        info!("event=db_attach module=db status=ok mode=file");
        Ok(Self {
            target: Target::File(path),
            _anchor: None,
        })
    }

    /// Creates an isolated in-memory store.
    ///
    /// Each call yields a distinct store, so tests never observe each other.
    pub fn open_in_memory() -> DbResult<Self> {
        let uri = format!(
            "file:bookbuddy-{}?mode=memory&cache=shared",
            Uuid::new_v4().simple()
        );
        let anchor = open_shared_memory(&uri)?;
        info!("event=db_attach module=db status=ok mode=memory");
        Ok(Self {
            target: Target::SharedMemory(uri),
            _anchor: Some(anchor),
        })
    }

    /// Returns the backing file path, or `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        match &self.target {
            Target::File(path) => Some(path.as_path()),
            Target::SharedMemory(_) => None,
        }
    }

    /// Opens a fresh, fully bootstrapped connection to the store.
    ///
    /// Callers own the connection; prefer [`Database::read`] and
    /// [`Database::write`], which scope it to one operation.
    pub fn connect(&self) -> DbResult<Connection> {
        match &self.target {
            Target::File(path) => open_db(path),
            Target::SharedMemory(uri) => open_shared_memory(uri),
        }
    }

    /// Runs a read-only unit of work on its own connection.
    ///
    /// The work runs inside a deferred transaction, so every query in it sees
    /// one snapshot. The transaction is rolled back when the work finishes.
    pub fn read<T, E>(
        &self,
        operation: &'static str,
        work: impl FnOnce(&Connection) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: UnitOfWorkError,
    {
        let started_at = Instant::now();
        let mut conn = self.connect()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Deferred)
            .map_err(DbError::from)?;
        let result = work(&tx);
        if let Err(rollback_err) = tx.rollback() {
            warn!(
                "event=db_rollback module=db status=error op={} error={}",
                operation, rollback_err
            );
        }
        drop(conn);

        log_outcome("db_read", operation, started_at, result.as_ref().err());
        result
    }

    /// Runs a write unit of work inside an immediate transaction.
    ///
    /// The transaction commits when `work` returns `Ok` and rolls back when it
    /// returns `Err`. The connection is closed before this function returns.
    pub fn write<T, E>(
        &self,
        operation: &'static str,
        work: impl FnOnce(&Transaction<'_>) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: UnitOfWorkError,
    {
        let started_at = Instant::now();
        let mut conn = self.connect()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(DbError::from)?;

        let result = match work(&tx) {
            Ok(value) => tx
                .commit()
                .map(|()| value)
                .map_err(|err| E::from(DbError::from(err))),
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    warn!(
                        "event=db_rollback module=db status=error op={} error={}",
                        operation, rollback_err
                    );
                }
                Err(err)
            }
        };
        drop(conn);

        log_outcome("db_write", operation, started_at, result.as_ref().err());
        result
    }
}

fn log_outcome<E: UnitOfWorkError>(
    event: &'static str,
    operation: &'static str,
    started_at: Instant,
    err: Option<&E>,
) {
    let duration_ms = started_at.elapsed().as_millis();
    match err {
        None => debug!(
            "event={} module=db status=ok op={} duration_ms={}",
            event, operation, duration_ms
        ),
        Some(err) => warn!(
            "event={} module=db status=error op={} duration_ms={} error_code={}",
            event,
            operation,
            duration_ms,
            err.error_code()
        ),
    }
}
