//! Directory of timestamped JSON snapshot files.
//!
//! Each write creates `archive-<epoch_ms>.json`; the file with the largest
//! timestamp is the current snapshot. Files are staged as temporary files in
//! the same directory and renamed into place, so readers never see a
//! half-written snapshot and failed writes leave no staging file behind.

use super::{ArchiveStorage, StorageError, StorageResult};
use crate::archive::RawArchive;
use crate::model::time::{now_ms, Timestamp};
use log::{debug, info};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const FILE_PREFIX: &str = "archive-";
const FILE_SUFFIX: &str = ".json";

#[derive(Debug, Clone)]
pub struct FileArchiveStorage {
    dir: PathBuf,
}

impl FileArchiveStorage {
    /// Uses `dir` for snapshots, creating it when missing.
    pub fn open(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Snapshot files present, oldest first.
    pub fn snapshot_files(&self) -> StorageResult<Vec<(Timestamp, PathBuf)>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if let Some(stamp) = path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(parse_file_stamp)
            {
                files.push((stamp, path));
            }
        }
        files.sort_by_key(|(stamp, _)| *stamp);
        Ok(files)
    }

    fn write_at(&self, snapshot: &RawArchive, written_at: Timestamp) -> StorageResult<PathBuf> {
        let mut stamp = written_at;
        let mut target = self.dir.join(file_name(stamp));
        while target.exists() {
            stamp += 1;
            target = self.dir.join(file_name(stamp));
        }

        let body = serde_json::to_vec_pretty(snapshot)?;
        persist_atomically(&self.dir, &body, &target)?;
        Ok(target)
    }
}

impl ArchiveStorage for FileArchiveStorage {
    fn get(&self) -> StorageResult<RawArchive> {
        let Some((stamp, path)) = self.snapshot_files()?.pop() else {
            debug!("event=snapshot_get module=storage backend=file status=empty");
            return Ok(RawArchive::default());
        };
        let body = fs::read(&path)?;
        let snapshot: RawArchive = serde_json::from_slice(&body).map_err(|err| {
            StorageError::InvalidData(format!("{}: {err}", path.display()))
        })?;
        debug!(
            "event=snapshot_get module=storage backend=file status=ok written_at={}",
            stamp
        );
        Ok(snapshot)
    }

    fn write_new(&self, snapshot: &RawArchive) -> StorageResult<()> {
        let target = self.write_at(snapshot, now_ms())?;
        info!(
            "event=snapshot_write module=storage backend=file status=ok tags={} narratives={} file={}",
            snapshot.tags.len(),
            snapshot.narratives.len(),
            target.display()
        );
        Ok(())
    }
}

/// Writes `body` to a staging file in `dir` and renames it onto `target`.
/// The staging file is removed when any step fails.
fn persist_atomically(dir: &Path, body: &[u8], target: &Path) -> std::io::Result<()> {
    let mut staging = NamedTempFile::new_in(dir)?;
    staging.write_all(body)?;
    staging.as_file().sync_all()?;
    staging.persist(target).map_err(|err| err.error)?;
    Ok(())
}

fn file_name(stamp: Timestamp) -> String {
    format!("{FILE_PREFIX}{stamp}{FILE_SUFFIX}")
}

fn parse_file_stamp(name: &str) -> Option<Timestamp> {
    name.strip_prefix(FILE_PREFIX)?
        .strip_suffix(FILE_SUFFIX)?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::{parse_file_stamp, persist_atomically, FileArchiveStorage};
    use crate::archive::RawArchive;

    #[test]
    fn file_stamp_parsing_ignores_foreign_files() {
        assert_eq!(parse_file_stamp("archive-1700.json"), Some(1700));
        assert_eq!(parse_file_stamp(".archive-1700.json.tmp"), None);
        assert_eq!(parse_file_stamp("notes.json"), None);
    }

    #[test]
    fn failed_rename_leaves_no_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing").join("archive-1.json");

        assert!(persist_atomically(dir.path(), b"{}", &target).is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn same_millisecond_writes_get_distinct_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileArchiveStorage::open(dir.path()).unwrap();

        let first = storage.write_at(&RawArchive::default(), 42).unwrap();
        let second = storage.write_at(&RawArchive::default(), 42).unwrap();
        assert_ne!(first, second);

        let stamps: Vec<i64> = storage
            .snapshot_files()
            .unwrap()
            .into_iter()
            .map(|(stamp, _)| stamp)
            .collect();
        assert_eq!(stamps, vec![42, 43]);
    }
}
