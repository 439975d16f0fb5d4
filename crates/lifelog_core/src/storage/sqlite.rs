//! SQLite table of snapshot rows; the newest row is the current snapshot.

use super::{ArchiveStorage, StorageError, StorageResult};
use crate::archive::RawArchive;
use crate::db::ensure_snapshot_table;
use crate::model::time::now_ms;
use log::info;
use rusqlite::{params, Connection, OptionalExtension};

pub struct SqliteArchiveStorage<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteArchiveStorage<'conn> {
    /// Wraps a connection opened through `db::open_db*`.
    pub fn try_new(conn: &'conn Connection) -> StorageResult<Self> {
        ensure_snapshot_table(conn)?;
        Ok(Self { conn })
    }

    pub fn snapshot_count(&self) -> StorageResult<u64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM archive_snapshots;", [], |row| row.get(0))?;
        u64::try_from(count).map_err(|_| StorageError::InvalidData(format!("row count {count}")))
    }
}

impl ArchiveStorage for SqliteArchiveStorage<'_> {
    fn get(&self) -> StorageResult<RawArchive> {
        let body: Option<String> = self
            .conn
            .query_row(
                "SELECT body
                 FROM archive_snapshots
                 ORDER BY id DESC
                 LIMIT 1;",
                [],
                |row| row.get(0),
            )
            .optional()?;

        match body {
            Some(body) => serde_json::from_str(&body)
                .map_err(|err| StorageError::InvalidData(format!("archive_snapshots.body: {err}"))),
            None => Ok(RawArchive::default()),
        }
    }

    fn write_new(&self, snapshot: &RawArchive) -> StorageResult<()> {
        let body = serde_json::to_string(snapshot)?;
        self.conn.execute(
            "INSERT INTO archive_snapshots (written_at, body) VALUES (?1, ?2);",
            params![now_ms(), body],
        )?;
        info!(
            "event=snapshot_write module=storage backend=sqlite status=ok tags={} narratives={}",
            snapshot.tags.len(),
            snapshot.narratives.len()
        );
        Ok(())
    }
}
