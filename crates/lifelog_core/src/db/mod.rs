//! SQLite home of archive snapshots.
//!
//! # Responsibility
//! - Open connections whose schema is migrated to the latest snapshot layout.
//! - Verify the snapshot table before any adapter reads or writes rows.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`.
//! - A connection returned by `open_db*` always has `archive_snapshots`.

use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

/// Table holding one JSON snapshot per row, newest row last.
pub const SNAPSHOT_TABLE: &str = "archive_snapshots";

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// Database was written by a newer build.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Connection was not opened through `open_db*`.
    MissingTable(&'static str),
}

impl DbError {
    /// Stable short code for log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Sqlite(_) => "db_sqlite",
            Self::UnsupportedSchemaVersion { .. } => "db_schema_too_new",
            Self::MissingTable(_) => "db_missing_table",
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "snapshot schema v{db_version} needs a newer build (this one reads up to v{latest_supported})"
            ),
            Self::MissingTable(table) => {
                write!(f, "snapshot database has no `{table}` table; open it with open_db")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::MissingTable(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Fails with `MissingTable` unless `archive_snapshots` exists.
pub fn ensure_snapshot_table(conn: &Connection) -> DbResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [SNAPSHOT_TABLE],
        |row| row.get(0),
    )?;
    if exists != 1 {
        return Err(DbError::MissingTable(SNAPSHOT_TABLE));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ensure_snapshot_table, open_db_in_memory, DbError, SNAPSHOT_TABLE};
    use rusqlite::Connection;

    #[test]
    fn migrated_connection_has_snapshot_table() {
        let conn = open_db_in_memory().unwrap();
        assert!(ensure_snapshot_table(&conn).is_ok());
    }

    #[test]
    fn bare_connection_reports_missing_table() {
        let conn = Connection::open_in_memory().unwrap();
        let err = ensure_snapshot_table(&conn).unwrap_err();
        assert!(matches!(err, DbError::MissingTable(SNAPSHOT_TABLE)));
        assert_eq!(err.code(), "db_missing_table");
    }
}
