use std::collections::BTreeMap;
use std::sync::Arc;

use super::context::EffectContext;
use super::definition::{DurationPolicy, EffectDefinition};
use crate::attribute::AttributeSnapshot;
use crate::tag::{GameplayTag, TagContainer};
use crate::targeting::HitResult;

/// An effect definition bound to a level and a source context.
///
/// Source attributes and tags are captured when the spec is built, so later
/// changes on the source never alter an outgoing spec. Set-by-caller values
/// are attached with the consuming builder before the spec is handed off.
#[derive(Clone, Debug, PartialEq)]
pub struct EffectSpec {
    definition: Arc<EffectDefinition>,
    level: u32,
    context: EffectContext,
    captured_source: AttributeSnapshot,
    source_tags: TagContainer,
    set_by_caller: BTreeMap<GameplayTag, f32>,
}

impl EffectSpec {
    pub fn new(
        definition: Arc<EffectDefinition>,
        level: u32,
        context: EffectContext,
        captured_source: AttributeSnapshot,
        source_tags: TagContainer,
    ) -> Self {
        Self {
            definition,
            level: level.max(1),
            context,
            captured_source,
            source_tags,
            set_by_caller: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_set_by_caller(mut self, tag: impl Into<GameplayTag>, magnitude: f32) -> Self {
        self.set_by_caller.insert(tag.into(), magnitude);
        self
    }

    /// Attaches the hit that selected the target this copy is applied to.
    #[must_use]
    pub fn with_hit_result(mut self, hit: HitResult) -> Self {
        self.context.hit_result = Some(hit);
        self
    }

    pub fn definition(&self) -> &Arc<EffectDefinition> {
        &self.definition
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn context(&self) -> &EffectContext {
        &self.context
    }

    pub fn captured_source(&self) -> &AttributeSnapshot {
        &self.captured_source
    }

    pub fn source_tags(&self) -> &TagContainer {
        &self.source_tags
    }

    pub fn set_by_caller(&self, tag: &GameplayTag) -> Option<f32> {
        self.set_by_caller.get(tag).copied()
    }

    /// Evaluated duration in seconds; `None` for instant and infinite effects.
    pub fn duration(&self) -> Option<f32> {
        match &self.definition.duration {
            DurationPolicy::HasDuration(seconds) => Some(seconds.evaluate(self.level).max(0.0)),
            DurationPolicy::Instant | DurationPolicy::Infinite => None,
        }
    }
}
