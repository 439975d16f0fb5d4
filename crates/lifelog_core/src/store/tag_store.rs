//! Tag store: lookup index, validation and copy-on-write mutations.
//!
//! # Responsibility
//! - Resolve tags case-insensitively by id, name or alias.
//! - Validate name uniqueness and connection integrity on every write.
//! - Create, patch and delete tags inside a working copy of a snapshot.
//!
//! # Invariants
//! - Mutations only touch the `RawArchive` they are handed; the archive
//!   facade passes a fresh clone, so a failed mutation leaves nothing behind.
//! - Deleting a tag removes every reference to its id (connections of other
//!   tags and tag lists of narratives).

use crate::archive::RawArchive;
use crate::error::{ArchiveError, ArchiveResult, TagValidationError};
use crate::model::id::IdGenerator;
use crate::model::tag::{NewTag, Tag, TagPatch};
use crate::model::time::Timestamp;
use crate::model::Meta;
use std::collections::{HashMap, HashSet};

/// Flat case-insensitive lookup keyed by id, name and every alias.
///
/// Built per query batch from a snapshot slice. When one key is shared by
/// several tags the first match wins, with ids taking precedence over names
/// and names over aliases.
#[derive(Debug, Clone)]
pub struct TagIndex<'a> {
    by_key: HashMap<String, &'a Tag>,
}

impl<'a> TagIndex<'a> {
    pub fn build(tags: &'a [Tag]) -> Self {
        let mut by_key = HashMap::with_capacity(tags.len() * 3);
        for tag in tags {
            by_key.entry(tag.id.to_lowercase()).or_insert(tag);
        }
        for tag in tags {
            by_key.entry(tag.name.to_lowercase()).or_insert(tag);
        }
        for tag in tags {
            for alias in &tag.aliases {
                by_key.entry(alias.to_lowercase()).or_insert(tag);
            }
        }
        Self { by_key }
    }

    pub fn load(&self, id_or_name: &str) -> Option<&'a Tag> {
        self.by_key.get(&id_or_name.to_lowercase()).copied()
    }

    /// One slot per key, in input order.
    pub fn load_many<S: AsRef<str>>(&self, keys: &[S]) -> Vec<Option<&'a Tag>> {
        keys.iter().map(|key| self.load(key.as_ref())).collect()
    }

    /// Like `load_many` with misses dropped.
    pub fn load_many_without_misses<S: AsRef<str>>(&self, keys: &[S]) -> Vec<&'a Tag> {
        keys.iter().filter_map(|key| self.load(key.as_ref())).collect()
    }
}

/// Validates a create/update candidate against every other tag.
///
/// The candidate's own id is excluded from both checks, so a tag keeps its
/// current names across an update. Because the own id is excluded, a tag can
/// never list itself in `connections`.
pub fn validate_tag(candidate: Tag, tags: &[Tag]) -> Result<Tag, TagValidationError> {
    if candidate.names().any(|name| name.trim().is_empty()) {
        return Err(TagValidationError::BlankName);
    }

    let own_id = candidate.id.as_str();
    let others = || tags.iter().filter(move |tag| tag.id != own_id);

    let other_ids: HashSet<&str> = others().map(|tag| tag.id.as_str()).collect();
    if let Some(missing) = candidate
        .connections
        .iter()
        .find(|id| !other_ids.contains(id.as_str()))
    {
        return Err(TagValidationError::UnresolvedConnection(missing.clone()));
    }

    let other_names: HashSet<String> = others().flat_map(Tag::lowercase_names).collect();
    if let Some(taken) = candidate
        .lowercase_names()
        .find(|name| other_names.contains(name))
    {
        return Err(TagValidationError::NameTaken(taken));
    }

    Ok(candidate)
}

pub fn create_new_tag(
    raw: &mut RawArchive,
    input: NewTag,
    now: Timestamp,
    ids: &mut dyn IdGenerator,
) -> ArchiveResult<Tag> {
    let candidate = Tag {
        id: ids.make_unique(),
        name: input.name,
        aliases: input.aliases.unwrap_or_default(),
        connections: input.connections.unwrap_or_default(),
        meta: Meta::new(now),
    };
    let tag = validate_tag(candidate, &raw.tags)?;
    raw.tags.push(tag.clone());
    Ok(tag)
}

pub fn update_tag(
    raw: &mut RawArchive,
    id: &str,
    patch: TagPatch,
    now: Timestamp,
) -> ArchiveResult<Tag> {
    let position = position_of(&raw.tags, id).ok_or_else(|| ArchiveError::tag_not_found(id))?;

    let mut candidate = patch.apply_to(&raw.tags[position]);
    candidate.meta = candidate.meta.touched(now);
    let tag = validate_tag(candidate, &raw.tags)?;
    raw.tags[position] = tag.clone();
    Ok(tag)
}

pub fn delete_tag(raw: &mut RawArchive, id: &str) -> ArchiveResult<Tag> {
    let position = position_of(&raw.tags, id).ok_or_else(|| ArchiveError::tag_not_found(id))?;
    let removed = raw.tags.remove(position);

    for tag in &mut raw.tags {
        tag.connections.retain(|connection| *connection != removed.id);
    }
    for narrative in &mut raw.narratives {
        narrative.tags.retain(|tag_id| *tag_id != removed.id);
    }
    Ok(removed)
}

fn position_of(tags: &[Tag], id: &str) -> Option<usize> {
    tags.iter().position(|tag| tag.id == id)
}
