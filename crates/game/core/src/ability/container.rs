use crate::effect::EffectSpec;
use crate::entity::EntityId;
use crate::targeting::{HitResult, TargetData, TargetDataHandle};

/// Targets plus ready-to-apply effect specs, built fresh for one activation step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EffectContainerSpec {
    pub target_data: TargetDataHandle,
    pub effect_specs: Vec<EffectSpec>,
}

impl EffectContainerSpec {
    pub fn has_valid_effects(&self) -> bool {
        !self.effect_specs.is_empty()
    }

    pub fn has_valid_targets(&self) -> bool {
        !self.target_data.is_empty()
    }

    /// Adds caller-supplied targets, for containers without a targeting rule.
    pub fn add_targets(&mut self, hits: Vec<HitResult>, actors: Vec<EntityId>) {
        self.target_data.add_targets(hits, actors);
    }

    /// Every targeted actor, in target data order. An actor listed twice is
    /// hit twice.
    pub fn target_actors(&self) -> Vec<EntityId> {
        self.target_data.iter().flat_map(TargetData::actors).collect()
    }
}
