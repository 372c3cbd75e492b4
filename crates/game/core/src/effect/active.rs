//! Bookkeeping of duration and infinite effects on one character.

use std::fmt;

use super::spec::EffectSpec;
use crate::entity::SourceObject;
use crate::tag::TagContainer;

/// Identifies one application of an effect.
///
/// Instant effects also receive a handle so callers can log the commit, but
/// only duration and infinite effects are found in the container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActiveEffectHandle(u64);

impl ActiveEffectHandle {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ActiveEffectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "effect#{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ActiveEffect {
    pub handle: ActiveEffectHandle,
    pub spec: EffectSpec,
    pub start_time: f32,
    /// `None` for infinite effects.
    pub duration: Option<f32>,
    /// Next scheduled execution for periodic effects.
    pub next_execution: Option<f32>,
}

impl ActiveEffect {
    pub fn end_time(&self) -> Option<f32> {
        self.duration.map(|d| self.start_time + d)
    }

    pub fn remaining(&self, now: f32) -> Option<f32> {
        self.end_time().map(|end| (end - now).max(0.0))
    }

    pub fn is_expired(&self, now: f32) -> bool {
        self.end_time().is_some_and(|end| end <= now)
    }

    pub fn granted_tags(&self) -> &TagContainer {
        &self.spec.definition().granted_tags
    }
}

/// Predicate over active effects, all set fields must match.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EffectQuery {
    pub source: Option<SourceObject>,
    pub owning_tags: Option<TagContainer>,
}

impl EffectQuery {
    pub fn from_source(source: SourceObject) -> Self {
        Self {
            source: Some(source),
            ..Self::default()
        }
    }

    /// Effects granting any of `tags`.
    pub fn owning_any(tags: TagContainer) -> Self {
        Self {
            owning_tags: Some(tags),
            ..Self::default()
        }
    }

    pub fn matches(&self, effect: &ActiveEffect) -> bool {
        if let Some(source) = &self.source
            && effect.spec.context().source_object.as_ref() != Some(source)
        {
            return false;
        }
        if let Some(tags) = &self.owning_tags
            && !effect.granted_tags().has_any(tags)
        {
            return false;
        }
        true
    }
}

/// Remaining time and total duration of one matching effect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectTiming {
    pub remaining: f32,
    pub duration: f32,
}

#[derive(Clone, Debug, Default)]
pub struct ActiveEffectsContainer {
    effects: Vec<ActiveEffect>,
    next_handle: u64,
}

impl ActiveEffectsContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn allocate_handle(&mut self) -> ActiveEffectHandle {
        self.next_handle += 1;
        ActiveEffectHandle(self.next_handle)
    }

    pub(crate) fn insert(&mut self, effect: ActiveEffect) {
        debug_assert!(self.get(effect.handle).is_none(), "duplicate active effect handle");
        self.effects.push(effect);
    }

    pub(crate) fn take(&mut self, handle: ActiveEffectHandle) -> Option<ActiveEffect> {
        let index = self.effects.iter().position(|e| e.handle == handle)?;
        Some(self.effects.remove(index))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut ActiveEffect> {
        self.effects.iter_mut()
    }

    pub fn get(&self, handle: ActiveEffectHandle) -> Option<&ActiveEffect> {
        self.effects.iter().find(|e| e.handle == handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveEffect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn matching(&self, query: &EffectQuery) -> Vec<ActiveEffectHandle> {
        self.effects
            .iter()
            .filter(|e| query.matches(e))
            .map(|e| e.handle)
            .collect()
    }

    pub fn expired(&self, now: f32) -> Vec<ActiveEffectHandle> {
        self.effects
            .iter()
            .filter(|e| e.is_expired(now))
            .map(|e| e.handle)
            .collect()
    }

    /// Union of the tags granted by every active effect.
    pub fn owned_tags(&self) -> TagContainer {
        let mut tags = TagContainer::new();
        for effect in &self.effects {
            tags.extend(effect.granted_tags());
        }
        tags
    }

    /// Timing of every matching effect that has a finite duration.
    pub fn timings(&self, query: &EffectQuery, now: f32) -> Vec<EffectTiming> {
        self.effects
            .iter()
            .filter(|e| query.matches(e))
            .filter_map(|e| {
                Some(EffectTiming {
                    remaining: e.remaining(now)?,
                    duration: e.duration?,
                })
            })
            .collect()
    }
}
