//! Domain model for the journal archive.
//!
//! # Responsibility
//! - Define the plain-data records stored in a snapshot (tags, narratives).
//! - Provide the interval algebra used to place narratives on the timeline.
//! - Provide injectable identifier generation.
//!
//! # Invariants
//! - Every record is identified by an opaque, immutable string id.
//! - Timestamps are epoch milliseconds.
//! - A narrative `stop`, when present, is never earlier than its `start`.

pub mod id;
pub mod narrative;
pub mod tag;
pub mod time;

use serde::{Deserialize, Serialize};
use time::Timestamp;

/// Bookkeeping timestamps shared by tags and narratives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    /// Creation time in epoch milliseconds.
    pub created: Timestamp,
    /// Last update time in epoch milliseconds.
    pub updated: Timestamp,
}

impl Meta {
    /// Creates metadata for a record born at `now`.
    pub fn new(now: Timestamp) -> Self {
        Self {
            created: now,
            updated: now,
        }
    }

    /// Returns a copy with `updated` moved to `now`.
    pub fn touched(self, now: Timestamp) -> Self {
        Self {
            created: self.created,
            updated: now,
        }
    }
}
