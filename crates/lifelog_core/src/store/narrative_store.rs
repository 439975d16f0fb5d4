//! Narrative store: timeline insertion with interval-conflict resolution.
//!
//! # Responsibility
//! - Insert a new narrative, trimming, splitting or dropping whatever it
//!   overlaps so the timeline stays free of overlaps.
//! - Create, update and delete narratives inside a working copy of a snapshot.
//!
//! # Invariants
//! - The narrative list is sorted ascending by `start` after every insert.
//! - An ongoing narrative ends at `now` for every comparison.
//! - Updates never move a narrative and never displace other narratives.
//! - Only a split mints a new id for an existing narrative.

use crate::archive::RawArchive;
use crate::error::{ArchiveError, ArchiveResult};
use crate::model::id::IdGenerator;
use crate::model::narrative::{Narrative, NarrativeInput, NarrativePatch};
use crate::model::tag::Tag;
use crate::model::time::{StoppedInterval, Time, Timestamp};
use crate::model::Meta;
use crate::store::tag_matcher::{match_tags, TagFilter};
use crate::store::tag_store::TagIndex;
use log::debug;
use std::cmp::Ordering;
use std::time::Duration;

/// Longest narrative accepted by `create_narrative`.
///
/// An overly long insert would silently drop every narrative it covers.
pub const DEFAULT_NARRATIVE_CEILING: Duration = Duration::from_secs(10 * 60 * 60);

/// How an existing narrative relates to the incoming one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Overlap {
    /// Existing lies fully inside (or equals) the incoming one.
    Covered,
    /// Incoming lies strictly inside the existing one.
    Encloses,
    /// Incoming starts inside the existing one and runs past its stop.
    TrimStop,
    /// Incoming starts at or before the existing one and stops inside it.
    TrimStart,
    Disjoint,
}

fn classify(incoming: &StoppedInterval, existing: &StoppedInterval) -> Overlap {
    let (n, o) = (incoming, existing);
    if n.start <= o.start && o.stop <= n.stop {
        Overlap::Covered
    } else if o.start < n.start && n.stop < o.stop {
        Overlap::Encloses
    } else if o.start < n.start && n.start < o.stop {
        Overlap::TrimStop
    } else if n.start <= o.start && o.start < n.stop {
        Overlap::TrimStart
    } else {
        Overlap::Disjoint
    }
}

/// Inserts `incoming` into `existing`, resolving every overlap in favor of
/// the incoming narrative, and returns the new timeline sorted by start.
pub fn add_narrative(
    incoming: Narrative,
    existing: Vec<Narrative>,
    now: Timestamp,
    ids: &mut dyn IdGenerator,
) -> Vec<Narrative> {
    let window = incoming.effective_interval(now);
    let mut timeline = Vec::with_capacity(existing.len() + 2);
    let (mut dropped, mut split, mut trimmed) = (0usize, 0usize, 0usize);

    for old in existing {
        match classify(&window, &old.effective_interval(now)) {
            Overlap::Covered => dropped += 1,
            Overlap::Encloses => {
                let tail = Narrative {
                    id: ids.make_unique(),
                    start: window.stop,
                    ..old.clone()
                };
                timeline.push(Narrative {
                    stop: Some(window.start),
                    ..old
                });
                timeline.push(tail);
                split += 1;
            }
            Overlap::TrimStop => {
                timeline.push(Narrative {
                    stop: Some(window.start),
                    ..old
                });
                trimmed += 1;
            }
            Overlap::TrimStart => {
                timeline.push(Narrative {
                    start: window.stop,
                    ..old
                });
                trimmed += 1;
            }
            Overlap::Disjoint => timeline.push(old),
        }
    }

    debug!(
        "event=narrative_resolve module=narrative_store dropped={} split={} trimmed={}",
        dropped, split, trimmed
    );

    timeline.push(incoming);
    sort_timeline(&mut timeline);
    timeline
}

/// Sorts ascending by start; equal starts put the earlier stop first and
/// ongoing narratives last.
pub fn sort_timeline(narratives: &mut [Narrative]) {
    narratives.sort_by(|a, b| match a.start.cmp(&b.start) {
        Ordering::Equal => stop_key(a).cmp(&stop_key(b)),
        other => other,
    });
}

fn stop_key(narrative: &Narrative) -> Timestamp {
    narrative.stop.unwrap_or(Timestamp::MAX)
}

pub fn create_narrative(
    raw: &mut RawArchive,
    input: NarrativeInput,
    now: Timestamp,
    ceiling: Duration,
    ids: &mut dyn IdGenerator,
) -> ArchiveResult<Narrative> {
    let tags = resolve_tag_ids(&raw.tags, input.tags_filter.as_ref(), &input.description)?;

    let time = input
        .time_selection
        .map(|selection| Time::from_selection(&selection, now))
        .unwrap_or(Time::Ongoing { start: now });
    let start = time.start();
    let stop = time.stop().unwrap_or(now);
    if stop < start {
        return Err(ArchiveError::InvalidInterval { start, stop });
    }

    let requested = time.duration(now);
    if requested > ceiling {
        return Err(ArchiveError::Guard { requested, ceiling });
    }

    let narrative = Narrative {
        id: ids.make_unique(),
        start,
        stop: time.stop(),
        tags,
        description: input.description,
        meta: Meta::new(now),
    };

    let existing = std::mem::take(&mut raw.narratives);
    raw.narratives = add_narrative(narrative.clone(), existing, now, ids);
    Ok(narrative)
}

/// Replaces description and, when needed, re-matches tags.
///
/// Tags are recomputed only when a filter is given or the description
/// actually changes.
pub fn update_narrative(
    raw: &mut RawArchive,
    patch: NarrativePatch,
    now: Timestamp,
) -> ArchiveResult<Narrative> {
    let position = raw
        .narratives
        .iter()
        .position(|narrative| narrative.id == patch.id)
        .ok_or_else(|| ArchiveError::narrative_not_found(patch.id.as_str()))?;
    let current = &raw.narratives[position];

    let description_changed = patch
        .description
        .as_ref()
        .is_some_and(|description| *description != current.description);
    let description = patch
        .description
        .unwrap_or_else(|| current.description.clone());

    let tags = if patch.tags_filter.is_some() || description_changed {
        resolve_tag_ids(&raw.tags, patch.tags_filter.as_ref(), &description)?
    } else {
        current.tags.clone()
    };

    let updated = Narrative {
        tags,
        description,
        meta: current.meta.touched(now),
        ..current.clone()
    };
    raw.narratives[position] = updated.clone();
    Ok(updated)
}

pub fn delete_narrative(raw: &mut RawArchive, id: &str) -> ArchiveResult<Narrative> {
    let position = raw
        .narratives
        .iter()
        .position(|narrative| narrative.id == id)
        .ok_or_else(|| ArchiveError::narrative_not_found(id))?;
    Ok(raw.narratives.remove(position))
}

fn resolve_tag_ids(
    tags: &[Tag],
    filter: Option<&TagFilter>,
    description: &str,
) -> ArchiveResult<Vec<String>> {
    let index = TagIndex::build(tags);
    Ok(match_tags(filter, description, &index)?
        .into_iter()
        .map(|tag| tag.id.clone())
        .collect())
}
