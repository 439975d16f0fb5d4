//! Snapshot persistence boundary.
//!
//! # Responsibility
//! - Define the two-operation storage contract callers use around the engine.
//! - Provide file-directory and SQLite implementations.
//!
//! # Invariants
//! - Every write persists a whole snapshot; there are no partial writes.
//! - `get` returns the most recently written snapshot, or an empty archive
//!   when nothing has been written yet.
//! - Concurrent writers are not coordinated: the last write wins.

use crate::archive::RawArchive;
use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod file;
pub mod sqlite;

pub use file::FileArchiveStorage;
pub use sqlite::SqliteArchiveStorage;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    Db(DbError),
    Serialization(serde_json::Error),
    InvalidData(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "snapshot io failed: {err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "snapshot encoding failed: {err}"),
            Self::InvalidData(message) => write!(f, "invalid stored snapshot: {message}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Durable home of archive snapshots.
pub trait ArchiveStorage {
    /// Loads the most recent snapshot.
    fn get(&self) -> StorageResult<RawArchive>;
    /// Persists a full snapshot as the new most recent one.
    fn write_new(&self, snapshot: &RawArchive) -> StorageResult<()>;
}
