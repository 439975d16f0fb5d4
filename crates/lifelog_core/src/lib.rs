//! Core of the LifeLog personal activity journal.
//! This crate owns the archive engine and every invariant of its snapshots.

pub mod archive;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod storage;
pub mod store;

pub use archive::{make_archive, Archive, Mutation, RawArchive};
pub use config::{ConfigError, EngineConfig};
pub use error::{ArchiveError, ArchiveResult, EntityKind, FilterConflict, TagValidationError};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::id::{make_unique, IdGenerator, SequenceIdGenerator, UuidIdGenerator};
pub use model::narrative::{Narrative, NarrativeInput, NarrativePatch};
pub use model::tag::{NewTag, Tag, TagPatch};
pub use model::time::{
    instant_is_in_interval, now_ms, StoppedInterval, Time, TimeSelection, Timestamp,
};
pub use model::Meta;
pub use storage::{
    ArchiveStorage, FileArchiveStorage, SqliteArchiveStorage, StorageError, StorageResult,
};
pub use store::narrative_store::DEFAULT_NARRATIVE_CEILING;
pub use store::tag_matcher::{TagFilter, TagSelector};
pub use store::tag_store::TagIndex;

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
