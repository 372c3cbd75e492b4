//! Authored effect definitions.

use std::fmt;

use super::magnitude::{ModifierMagnitude, ScalableFloat};
use crate::attribute::{AttributeKind, ModifierOp};
use crate::tag::{GameplayTag, TagContainer};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct EffectId(pub String);

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EffectId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DurationPolicy {
    /// Committed to base values immediately, never tracked.
    #[default]
    Instant,
    /// Tracked until the evaluated duration (seconds) elapses.
    HasDuration(ScalableFloat),
    /// Tracked until removed explicitly.
    Infinite,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModifierInfo {
    pub attribute: AttributeKind,
    pub op: ModifierOp,
    pub magnitude: ModifierMagnitude,
}

/// Custom calculation run when an effect executes.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectExecution {
    /// `base_damage × source AttackPower / target DefensePower` into Damage.
    Damage { base_damage: ScalableFloat },
}

/// Immutable description of an effect, shared by every spec built from it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectDefinition {
    pub id: EffectId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub duration: DurationPolicy,
    /// Seconds between executions. Periodic effects execute their modifiers
    /// instead of contributing live modifiers.
    #[cfg_attr(feature = "serde", serde(default))]
    pub period: Option<f32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub modifiers: Vec<ModifierInfo>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub executions: Vec<EffectExecution>,
    /// Tags owned by the target while the effect is active.
    #[cfg_attr(feature = "serde", serde(default))]
    pub granted_tags: TagContainer,
    #[cfg_attr(feature = "serde", serde(default))]
    pub asset_tags: TagContainer,
}

impl EffectDefinition {
    pub fn instant(id: impl Into<String>) -> Self {
        Self {
            id: EffectId(id.into()),
            duration: DurationPolicy::Instant,
            period: None,
            modifiers: Vec::new(),
            executions: Vec::new(),
            granted_tags: TagContainer::new(),
            asset_tags: TagContainer::new(),
        }
    }

    pub fn with_duration(id: impl Into<String>, seconds: impl Into<ScalableFloat>) -> Self {
        Self {
            duration: DurationPolicy::HasDuration(seconds.into()),
            ..Self::instant(id)
        }
    }

    pub fn infinite(id: impl Into<String>) -> Self {
        Self {
            duration: DurationPolicy::Infinite,
            ..Self::instant(id)
        }
    }

    #[must_use]
    pub fn modifier(
        mut self,
        attribute: AttributeKind,
        op: ModifierOp,
        magnitude: impl Into<ModifierMagnitude>,
    ) -> Self {
        self.modifiers.push(ModifierInfo {
            attribute,
            op,
            magnitude: magnitude.into(),
        });
        self
    }

    #[must_use]
    pub fn execution(mut self, execution: EffectExecution) -> Self {
        self.executions.push(execution);
        self
    }

    #[must_use]
    pub fn granting_tag(mut self, tag: impl Into<GameplayTag>) -> Self {
        self.granted_tags.insert(tag.into());
        self
    }

    #[must_use]
    pub fn every(mut self, period: f32) -> Self {
        self.period = Some(period);
        self
    }

    pub fn is_instant(&self) -> bool {
        matches!(self.duration, DurationPolicy::Instant)
    }

    pub fn is_periodic(&self) -> bool {
        !self.is_instant() && self.period.is_some_and(|p| p > 0.0)
    }
}
