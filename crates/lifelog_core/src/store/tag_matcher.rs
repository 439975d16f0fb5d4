//! Tag matching for narratives.
//!
//! # Responsibility
//! - Normalize include/exclude tag filters and reject contradictory ones.
//! - Resolve the tags of a narrative from its filter plus the words of its
//!   description.
//!
//! # Invariants
//! - Unknown names and words are ignored, never reported.
//! - Exclusion always wins over inclusion and over description words.
//! - The result holds each tag at most once, in first-resolved order.

use crate::error::{ArchiveResult, FilterConflict};
use crate::model::tag::Tag;
use crate::store::tag_store::TagIndex;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Names and ids on one side of a filter; both lists optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSelector {
    #[serde(default)]
    pub names: Option<Vec<String>>,
    #[serde(default)]
    pub ids: Option<Vec<String>>,
}

/// Include/exclude tag filter as received from callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFilter {
    #[serde(default)]
    pub include: Option<TagSelector>,
    #[serde(default)]
    pub exclude: Option<TagSelector>,
}

impl TagFilter {
    pub fn include_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            include: Some(TagSelector {
                names: Some(names.into_iter().map(Into::into).collect()),
                ids: None,
            }),
            exclude: None,
        }
    }

    pub fn exclude_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            include: None,
            exclude: Some(TagSelector {
                names: None,
                ids: Some(ids.into_iter().map(Into::into).collect()),
            }),
        }
    }
}

/// Filter side with missing lists defaulted to empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagRefs {
    pub names: Vec<String>,
    pub ids: Vec<String>,
}

impl From<Option<&TagSelector>> for TagRefs {
    fn from(value: Option<&TagSelector>) -> Self {
        let selector = value.cloned().unwrap_or_default();
        Self {
            names: selector.names.unwrap_or_default(),
            ids: selector.ids.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedTagFilter {
    pub include: TagRefs,
    pub exclude: TagRefs,
}

/// Defaults missing lists and rejects entries present on both sides.
///
/// Names compare case-insensitively, ids exactly.
pub fn normalize_filter(filter: Option<&TagFilter>) -> ArchiveResult<NormalizedTagFilter> {
    let include = TagRefs::from(filter.and_then(|value| value.include.as_ref()));
    let exclude = TagRefs::from(filter.and_then(|value| value.exclude.as_ref()));

    let excluded_names: HashSet<String> =
        exclude.names.iter().map(|name| name.to_lowercase()).collect();
    if let Some(name) = include
        .names
        .iter()
        .find(|name| excluded_names.contains(&name.to_lowercase()))
    {
        return Err(FilterConflict::Name(name.clone()).into());
    }

    if let Some(id) = include.ids.iter().find(|id| exclude.ids.contains(*id)) {
        return Err(FilterConflict::Id(id.clone()).into());
    }

    Ok(NormalizedTagFilter { include, exclude })
}

/// Resolves the tags for a narrative, surfacing filter conflicts.
pub fn match_tags<'a>(
    filter: Option<&TagFilter>,
    description: &str,
    index: &TagIndex<'a>,
) -> ArchiveResult<Vec<&'a Tag>> {
    let filter = normalize_filter(filter)?;

    let mut candidate_keys: Vec<&str> = filter.include.names.iter().map(String::as_str).collect();
    candidate_keys.extend(description.split_whitespace());
    candidate_keys.extend(filter.include.ids.iter().map(String::as_str));
    let candidates = index.load_many_without_misses(&candidate_keys);

    let exclude_keys: Vec<&str> = filter
        .exclude
        .ids
        .iter()
        .chain(filter.exclude.names.iter())
        .map(String::as_str)
        .collect();
    let mut excluded: HashSet<&str> = index
        .load_many_without_misses(&exclude_keys)
        .into_iter()
        .map(|tag| tag.id.as_str())
        .collect();
    excluded.extend(filter.exclude.ids.iter().map(String::as_str));

    let mut seen = HashSet::new();
    Ok(candidates
        .into_iter()
        .filter(|tag| !excluded.contains(tag.id.as_str()))
        .filter(|tag| seen.insert(tag.id.as_str()))
        .collect())
}

/// Resolves the tags for a narrative, yielding no tags for a contradictory
/// filter.
///
/// Use `match_tags` when the conflict must reach the caller.
pub fn get_matching_tags<'a>(
    filter: Option<&TagFilter>,
    description: &str,
    index: &TagIndex<'a>,
) -> Vec<&'a Tag> {
    match match_tags(filter, description, index) {
        Ok(tags) => tags,
        Err(err) => {
            warn!(
                "event=tag_match module=tag_matcher status=error error_code={} fallback=empty",
                err.code()
            );
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{get_matching_tags, match_tags, normalize_filter, TagFilter, TagSelector};
    use crate::error::{ArchiveError, FilterConflict};
    use crate::model::tag::Tag;
    use crate::model::Meta;
    use crate::store::tag_store::TagIndex;

    fn tag(id: &str, name: &str, aliases: &[&str]) -> Tag {
        Tag {
            id: id.to_string(),
            name: name.to_string(),
            aliases: aliases.iter().map(|value| value.to_string()).collect(),
            connections: Vec::new(),
            meta: Meta::new(0),
        }
    }

    fn ids(tags: &[&Tag]) -> Vec<String> {
        tags.iter().map(|tag| tag.id.clone()).collect()
    }

    #[test]
    fn exclusion_by_id_beats_description_word() {
        let pool = vec![tag("123", "lol", &["test"])];
        let index = TagIndex::build(&pool);
        let filter = TagFilter::exclude_ids(["123"]);

        let matched = get_matching_tags(Some(&filter), "lol", &index);
        assert!(matched.is_empty());
    }

    #[test]
    fn description_words_and_included_names_resolve_once() {
        let pool = vec![tag("1", "cats", &["kittens"]), tag("2", "work", &[])];
        let index = TagIndex::build(&pool);
        let filter = TagFilter::include_names(["Work", "cats"]);

        let matched = match_tags(Some(&filter), "fed the KITTENS before work", &index).unwrap();
        assert_eq!(ids(&matched), vec!["2", "1"]);
    }

    #[test]
    fn unknown_words_are_ignored() {
        let pool = vec![tag("1", "cats", &[])];
        let index = TagIndex::build(&pool);

        let matched = match_tags(None, "nothing to see here", &index).unwrap();
        assert!(matched.is_empty());
    }

    #[test]
    fn exclusion_by_name_removes_included_id() {
        let pool = vec![tag("1", "cats", &["kittens"])];
        let index = TagIndex::build(&pool);
        let filter = TagFilter {
            include: Some(TagSelector {
                names: None,
                ids: Some(vec!["1".to_string()]),
            }),
            exclude: Some(TagSelector {
                names: Some(vec!["kittens".to_string()]),
                ids: None,
            }),
        };

        let matched = match_tags(Some(&filter), "", &index).unwrap();
        assert!(matched.is_empty());
    }

    #[test]
    fn contradictory_filter_is_rejected_by_normalization() {
        let filter = TagFilter {
            include: Some(TagSelector {
                names: Some(vec!["Cats".to_string()]),
                ids: None,
            }),
            exclude: Some(TagSelector {
                names: Some(vec!["cats".to_string()]),
                ids: None,
            }),
        };
        let err = normalize_filter(Some(&filter)).unwrap_err();
        assert_eq!(
            err,
            ArchiveError::Conflict(FilterConflict::Name("Cats".to_string()))
        );

        let pool = vec![tag("1", "cats", &[])];
        let index = TagIndex::build(&pool);
        assert!(get_matching_tags(Some(&filter), "cats", &index).is_empty());
    }

    #[test]
    fn missing_filter_normalizes_to_empty_lists() {
        let normalized = normalize_filter(None).unwrap();
        assert!(normalized.include.names.is_empty());
        assert!(normalized.exclude.ids.is_empty());

        let wire: TagFilter = serde_json::from_str(r#"{"exclude": {"ids": ["9"]}}"#).unwrap();
        let normalized = normalize_filter(Some(&wire)).unwrap();
        assert_eq!(normalized.exclude.ids, vec!["9".to_string()]);
        assert!(normalized.include.ids.is_empty());
    }
}
