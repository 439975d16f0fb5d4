//! Tag records and their create/update inputs.
//!
//! # Invariants
//! - `id` is assigned once at creation and never changes.
//! - Name and aliases are unique case-insensitively across the whole archive.
//! - Every id in `connections` names another tag of the same snapshot.

use super::Meta;
use serde::{Deserialize, Serialize};

/// Named label attached to narratives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    /// Primary display name.
    pub name: String,
    /// Alternative names, in user order.
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Ids of related tags.
    #[serde(default)]
    pub connections: Vec<String>,
    pub meta: Meta,
}

impl Tag {
    /// Name followed by every alias, as stored.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Lower-cased name and aliases, the keys used for uniqueness checks.
    pub fn lowercase_names(&self) -> impl Iterator<Item = String> + '_ {
        self.names().map(str::to_lowercase)
    }
}

/// Input for creating a tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTag {
    pub name: String,
    #[serde(default)]
    pub aliases: Option<Vec<String>>,
    #[serde(default)]
    pub connections: Option<Vec<String>>,
}

impl NewTag {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Partial update for a tag. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub aliases: Option<Vec<String>>,
    #[serde(default)]
    pub connections: Option<Vec<String>>,
}

impl TagPatch {
    /// Applies this patch over `tag`, leaving absent fields untouched.
    pub fn apply_to(self, tag: &Tag) -> Tag {
        Tag {
            id: tag.id.clone(),
            name: self.name.unwrap_or_else(|| tag.name.clone()),
            aliases: self.aliases.unwrap_or_else(|| tag.aliases.clone()),
            connections: self.connections.unwrap_or_else(|| tag.connections.clone()),
            meta: tag.meta,
        }
    }
}
