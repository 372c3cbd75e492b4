use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::effect::EffectDefinition;
use crate::tag::{GameplayTag, TagContainer};
use crate::targeting::TargetType;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct AbilityId(pub String);

impl fmt::Display for AbilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AbilityId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// How many concurrent instances a granted ability may run.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum InstancingPolicy {
    /// One activation at a time, no per-activation state.
    NonInstanced,
    /// One instance per owner, reused by every activation.
    #[default]
    InstancedPerActor,
    /// A fresh instance per activation, up to the configured cap.
    InstancedPerExecution,
}

/// Targeting rule plus the effects applied to whatever it selects.
#[derive(Clone, Debug, Default)]
pub struct EffectContainer {
    /// `None` leaves targeting to the caller.
    pub target_type: Option<TargetType>,
    pub effects: Vec<Arc<EffectDefinition>>,
}

impl EffectContainer {
    pub fn new(target_type: Option<TargetType>) -> Self {
        Self {
            target_type,
            effects: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Arc<EffectDefinition>) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Authored ability.
#[derive(Clone, Debug)]
pub struct AbilityDefinition {
    pub id: AbilityId,
    pub ability_tags: TagContainer,
    /// Activation fails while the owner has any of these.
    pub activation_blocked_tags: TagContainer,
    /// Activation fails unless the owner has all of these.
    pub activation_required_tags: TagContainer,
    pub cost: Option<Arc<EffectDefinition>>,
    pub cooldown: Option<Arc<EffectDefinition>>,
    pub instancing: InstancingPolicy,
    pub effect_containers: BTreeMap<GameplayTag, EffectContainer>,
}

impl AbilityDefinition {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: AbilityId(id.into()),
            ability_tags: TagContainer::new(),
            activation_blocked_tags: TagContainer::new(),
            activation_required_tags: TagContainer::new(),
            cost: None,
            cooldown: None,
            instancing: InstancingPolicy::default(),
            effect_containers: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn tagged(mut self, tag: impl Into<GameplayTag>) -> Self {
        self.ability_tags.insert(tag.into());
        self
    }

    #[must_use]
    pub fn blocked_by(mut self, tag: impl Into<GameplayTag>) -> Self {
        self.activation_blocked_tags.insert(tag.into());
        self
    }

    #[must_use]
    pub fn requires(mut self, tag: impl Into<GameplayTag>) -> Self {
        self.activation_required_tags.insert(tag.into());
        self
    }

    #[must_use]
    pub fn with_cost(mut self, cost: Arc<EffectDefinition>) -> Self {
        self.cost = Some(cost);
        self
    }

    #[must_use]
    pub fn with_cooldown(mut self, cooldown: Arc<EffectDefinition>) -> Self {
        self.cooldown = Some(cooldown);
        self
    }

    #[must_use]
    pub fn with_instancing(mut self, instancing: InstancingPolicy) -> Self {
        self.instancing = instancing;
        self
    }

    #[must_use]
    pub fn with_container(mut self, event: impl Into<GameplayTag>, container: EffectContainer) -> Self {
        self.effect_containers.insert(event.into(), container);
        self
    }

    pub fn effect_container(&self, event: &GameplayTag) -> Option<&EffectContainer> {
        self.effect_containers.get(event)
    }

    /// Tags granted by the cooldown effect, empty without a cooldown.
    pub fn cooldown_tags(&self) -> TagContainer {
        self.cooldown
            .as_ref()
            .map(|cooldown| cooldown.granted_tags.clone())
            .unwrap_or_default()
    }
}
