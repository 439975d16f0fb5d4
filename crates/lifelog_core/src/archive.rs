//! Archive facade over one immutable snapshot.
//!
//! # Responsibility
//! - Wrap a raw `{ tags, narratives }` snapshot behind query and mutation
//!   methods.
//! - Emit metadata-only `archive_*` log events for every mutation.
//!
//! # Invariants
//! - Queries never change the snapshot.
//! - Mutations clone the snapshot first and return a brand-new `Archive`;
//!   the receiver stays valid and unchanged, on success and on error.
//! - The facade never persists anything; callers hand the returned raw
//!   snapshot to an `ArchiveStorage` themselves.

use crate::error::ArchiveResult;
use crate::model::id::IdGenerator;
use crate::model::narrative::{Narrative, NarrativeInput, NarrativePatch};
use crate::model::tag::{NewTag, Tag, TagPatch};
use crate::model::time::{instant_is_in_interval, Timestamp};
use crate::store::narrative_store::{self, DEFAULT_NARRATIVE_CEILING};
use crate::store::tag_matcher::{self, TagFilter};
use crate::store::tag_store::{self, TagIndex};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Plain, serializable snapshot data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawArchive {
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Kept sorted ascending by `start`.
    #[serde(default)]
    pub narratives: Vec<Narrative>,
}

/// Result of a mutation: the affected value plus the new snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation<T> {
    pub result: T,
    pub archive: Archive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    raw: RawArchive,
    narrative_ceiling: Duration,
}

/// Builds an archive over `raw` with default limits.
pub fn make_archive(raw: RawArchive) -> Archive {
    Archive::from_raw(raw)
}

impl Archive {
    pub fn from_raw(raw: RawArchive) -> Self {
        Self {
            raw,
            narrative_ceiling: DEFAULT_NARRATIVE_CEILING,
        }
    }

    /// Overrides the longest narrative `create_narrative` accepts.
    pub fn with_narrative_ceiling(mut self, ceiling: Duration) -> Self {
        self.narrative_ceiling = ceiling;
        self
    }

    pub fn narrative_ceiling(&self) -> Duration {
        self.narrative_ceiling
    }

    pub fn raw(&self) -> &RawArchive {
        &self.raw
    }

    pub fn into_raw(self) -> RawArchive {
        self.raw
    }

    pub fn tag_index(&self) -> TagIndex<'_> {
        TagIndex::build(&self.raw.tags)
    }

    // Tag queries.

    pub fn get_raw_tag_by_id(&self, id: &str) -> Option<&Tag> {
        self.tag_index().load(id)
    }

    pub fn get_raw_tag_by_name(&self, name_or_alias: &str) -> Option<&Tag> {
        self.tag_index().load(name_or_alias)
    }

    pub fn get_raw_tags_by_ids<S: AsRef<str>>(&self, ids: &[S]) -> Vec<Option<&Tag>> {
        self.tag_index().load_many(ids)
    }

    pub fn get_raw_tags_by_names<S: AsRef<str>>(&self, names: &[S]) -> Vec<Option<&Tag>> {
        self.tag_index().load_many(names)
    }

    pub fn get_all_raw_tags(&self) -> &[Tag] {
        &self.raw.tags
    }

    /// Tags a narrative with this filter and description would receive.
    pub fn get_matching_tags(&self, filter: Option<&TagFilter>, description: &str) -> Vec<&Tag> {
        tag_matcher::get_matching_tags(filter, description, &self.tag_index())
    }

    // Narrative queries.

    pub fn get_raw_narrative_by_id(&self, id: &str) -> Option<&Narrative> {
        self.raw.narratives.iter().find(|narrative| narrative.id == id)
    }

    pub fn get_raw_narratives_by_ids<S: AsRef<str>>(&self, ids: &[S]) -> Vec<Option<&Narrative>> {
        ids.iter()
            .map(|id| self.get_raw_narrative_by_id(id.as_ref()))
            .collect()
    }

    pub fn get_all_raw_narratives(&self) -> &[Narrative] {
        &self.raw.narratives
    }

    pub fn get_ongoing_narratives(&self) -> Vec<&Narrative> {
        self.raw
            .narratives
            .iter()
            .filter(|narrative| narrative.is_ongoing())
            .collect()
    }

    /// Narratives covering `instant`, using the start-exclusive,
    /// stop-inclusive membership rule. Ongoing narratives end at `now`.
    pub fn get_narratives_at(&self, instant: Timestamp, now: Timestamp) -> Vec<&Narrative> {
        self.raw
            .narratives
            .iter()
            .filter(|narrative| instant_is_in_interval(instant, &narrative.effective_interval(now)))
            .collect()
    }

    // Tag mutations.

    pub fn create_new_tag(
        &self,
        input: NewTag,
        now: Timestamp,
        ids: &mut dyn IdGenerator,
    ) -> ArchiveResult<Mutation<Tag>> {
        self.mutate("tag_create", |raw| {
            tag_store::create_new_tag(raw, input, now, ids)
        })
    }

    pub fn update_tag(
        &self,
        id: &str,
        patch: TagPatch,
        now: Timestamp,
    ) -> ArchiveResult<Mutation<Tag>> {
        self.mutate("tag_update", |raw| tag_store::update_tag(raw, id, patch, now))
    }

    /// Deletes a tag and every reference to it. The result is always `true`.
    pub fn delete_tag(&self, id: &str) -> ArchiveResult<Mutation<bool>> {
        self.mutate("tag_delete", |raw| {
            tag_store::delete_tag(raw, id).map(|_| true)
        })
    }

    // Narrative mutations.

    pub fn create_narrative(
        &self,
        input: NarrativeInput,
        now: Timestamp,
        ids: &mut dyn IdGenerator,
    ) -> ArchiveResult<Mutation<Narrative>> {
        let ceiling = self.narrative_ceiling;
        self.mutate("narrative_create", |raw| {
            narrative_store::create_narrative(raw, input, now, ceiling, ids)
        })
    }

    pub fn update_narrative(
        &self,
        patch: NarrativePatch,
        now: Timestamp,
    ) -> ArchiveResult<Mutation<Narrative>> {
        self.mutate("narrative_update", |raw| {
            narrative_store::update_narrative(raw, patch, now)
        })
    }

    pub fn delete_narrative(&self, id: &str) -> ArchiveResult<Mutation<Narrative>> {
        self.mutate("narrative_delete", |raw| {
            narrative_store::delete_narrative(raw, id)
        })
    }

    fn mutate<T>(
        &self,
        event: &'static str,
        apply: impl FnOnce(&mut RawArchive) -> ArchiveResult<T>,
    ) -> ArchiveResult<Mutation<T>> {
        let mut raw = self.raw.clone();
        match apply(&mut raw) {
            Ok(result) => {
                info!(
                    "event=archive_{} module=archive status=ok tags={} narratives={}",
                    event,
                    raw.tags.len(),
                    raw.narratives.len()
                );
                Ok(Mutation {
                    result,
                    archive: Self {
                        raw,
                        narrative_ceiling: self.narrative_ceiling,
                    },
                })
            }
            Err(err) => {
                warn!(
                    "event=archive_{} module=archive status=error error_code={}",
                    event,
                    err.code()
                );
                Err(err)
            }
        }
    }
}

impl From<RawArchive> for Archive {
    fn from(value: RawArchive) -> Self {
        Self::from_raw(value)
    }
}
