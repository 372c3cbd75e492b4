//! Hierarchical gameplay tags.
//!
//! Tags are dotted names such as `Ability.Skill.Fireball`. A tag matches any of
//! its ancestors: `Cooldown.Skill.Fireball` matches `Cooldown.Skill` and
//! `Cooldown`, but not `Cooldown.Ski`.
use std::collections::BTreeSet;
use std::fmt;

/// A single dotted gameplay tag.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct GameplayTag(String);

impl GameplayTag {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if `self` equals `other` or is a descendant of it.
    pub fn matches(&self, other: &GameplayTag) -> bool {
        match self.0.strip_prefix(other.0.as_str()) {
            Some("") => true,
            Some(rest) => rest.starts_with('.'),
            None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for GameplayTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GameplayTag {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// An ordered set of tags with hierarchical queries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TagContainer {
    tags: BTreeSet<GameplayTag>,
}

impl TagContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(tag: impl Into<GameplayTag>) -> Self {
        let mut container = Self::new();
        container.insert(tag.into());
        container
    }

    pub fn insert(&mut self, tag: GameplayTag) -> bool {
        self.tags.insert(tag)
    }

    pub fn remove(&mut self, tag: &GameplayTag) -> bool {
        self.tags.remove(tag)
    }

    pub fn extend(&mut self, other: &TagContainer) {
        self.tags.extend(other.tags.iter().cloned());
    }

    /// True if any owned tag matches `tag` (hierarchically).
    pub fn has_tag(&self, tag: &GameplayTag) -> bool {
        self.tags.iter().any(|owned| owned.matches(tag))
    }

    pub fn has_tag_exact(&self, tag: &GameplayTag) -> bool {
        self.tags.contains(tag)
    }

    /// True if at least one tag of `other` is matched. Empty `other` never matches.
    pub fn has_any(&self, other: &TagContainer) -> bool {
        other.tags.iter().any(|tag| self.has_tag(tag))
    }

    /// True if every tag of `other` is matched. Empty `other` always matches.
    pub fn has_all(&self, other: &TagContainer) -> bool {
        other.tags.iter().all(|tag| self.has_tag(tag))
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameplayTag> {
        self.tags.iter()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl<T: Into<GameplayTag>> FromIterator<T> for TagContainer {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            tags: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for TagContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, tag) in self.tags.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{tag}")?;
        }
        f.write_str("]")
    }
}
