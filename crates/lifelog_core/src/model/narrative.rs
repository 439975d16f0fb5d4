//! Narrative records: what happened over one stretch of time.
//!
//! # Invariants
//! - `stop`, when present, is `>= start`; `None` means still ongoing.
//! - `tags` holds tag ids resolved at creation (or on a re-matching update).

use super::time::{StoppedInterval, Time, TimeSelection, Timestamp};
use super::Meta;
use crate::store::tag_matcher::TagFilter;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Narrative {
    pub id: String,
    pub start: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<Timestamp>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub description: String,
    pub meta: Meta,
}

impl Narrative {
    pub fn is_ongoing(&self) -> bool {
        self.stop.is_none()
    }

    pub fn time(&self) -> Time {
        match self.stop {
            Some(stop) => Time::Stopped(StoppedInterval {
                start: self.start,
                stop,
            }),
            None => Time::Ongoing { start: self.start },
        }
    }

    /// Interval used for comparisons; an ongoing narrative ends at `now`,
    /// or at its own start when that lies after `now`.
    pub fn effective_interval(&self, now: Timestamp) -> StoppedInterval {
        StoppedInterval {
            start: self.start,
            stop: self.stop.unwrap_or_else(|| now.max(self.start)),
        }
    }
}

/// Input for recording a new narrative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeInput {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags_filter: Option<TagFilter>,
    /// `None` records an ongoing narrative starting now.
    #[serde(default)]
    pub time_selection: Option<TimeSelection>,
}

/// Partial update for a narrative. Never moves it on the timeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativePatch {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags_filter: Option<TagFilter>,
}
