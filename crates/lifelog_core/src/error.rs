//! Error taxonomy of the archive engine.
//!
//! # Responsibility
//! - Describe every expected failure of a query or mutation as a value.
//!
//! # Invariants
//! - Engine operations return these errors; they never panic for them.
//! - Errors carry ids and sizes only, never user-entered text, so they are
//!   safe to log verbatim.

use crate::model::time::Timestamp;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Kind of record an id failed to resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Tag,
    Narrative,
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tag => write!(f, "tag"),
            Self::Narrative => write!(f, "narrative"),
        }
    }
}

/// Reason a tag candidate was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValidationError {
    /// At least one connection does not resolve to another tag.
    UnresolvedConnection(String),
    /// Name or alias already exists elsewhere (case-insensitive).
    NameTaken(String),
    /// Name or alias is empty after trimming.
    BlankName,
}

impl Display for TagValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnresolvedConnection(id) => {
                write!(f, "at least one connection does not resolve: {id}")
            }
            Self::NameTaken(_) => write!(f, "name already exists elsewhere"),
            Self::BlankName => write!(f, "tag names and aliases must not be blank"),
        }
    }
}

impl Error for TagValidationError {}

/// Which side of a tag filter repeated an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterConflict {
    Name(String),
    Id(String),
}

impl Display for FilterConflict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Name(_) => write!(f, "a tag name is both included and excluded"),
            Self::Id(id) => write!(f, "tag id `{id}` is both included and excluded"),
        }
    }
}

impl Error for FilterConflict {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveError {
    NotFound { entity: EntityKind, id: String },
    Validation(TagValidationError),
    Conflict(FilterConflict),
    /// Requested narrative is longer than the data-protection ceiling.
    Guard {
        requested: Duration,
        ceiling: Duration,
    },
    /// Stop precedes start.
    InvalidInterval { start: Timestamp, stop: Timestamp },
}

impl ArchiveError {
    pub fn tag_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: EntityKind::Tag,
            id: id.into(),
        }
    }

    pub fn narrative_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: EntityKind::Narrative,
            id: id.into(),
        }
    }

    /// Stable short code, used in log lines and by transport layers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Validation(_) => "validation",
            Self::Conflict(_) => "conflict",
            Self::Guard { .. } => "guard",
            Self::InvalidInterval { .. } => "invalid_interval",
        }
    }
}

impl Display for ArchiveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Conflict(err) => write!(f, "tag filter conflict: {err}"),
            Self::Guard { requested, ceiling } => write!(
                f,
                "narrative spans {}s which exceeds the {}s ceiling; refusing to overwrite history",
                requested.as_secs(),
                ceiling.as_secs()
            ),
            Self::InvalidInterval { start, stop } => {
                write!(f, "interval stop {stop} is earlier than start {start}")
            }
        }
    }
}

impl Error for ArchiveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Conflict(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TagValidationError> for ArchiveError {
    fn from(value: TagValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<FilterConflict> for ArchiveError {
    fn from(value: FilterConflict) -> Self {
        Self::Conflict(value)
    }
}
