//! Modifier magnitudes.

use tracing::warn;

use super::spec::EffectSpec;
use crate::attribute::{AttributeKind, AttributeSet};
use crate::tag::GameplayTag;

/// A value scaled by an optional per-level curve.
///
/// Level 1 reads the first curve entry; levels past the end of the curve
/// reuse the last entry.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScalableFloat {
    pub value: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub curve: Vec<f32>,
}

impl ScalableFloat {
    pub fn constant(value: f32) -> Self {
        Self {
            value,
            curve: Vec::new(),
        }
    }

    pub fn with_curve(value: f32, curve: Vec<f32>) -> Self {
        Self { value, curve }
    }

    pub fn evaluate(&self, level: u32) -> f32 {
        if self.curve.is_empty() {
            return self.value;
        }
        let index = (level.max(1) as usize - 1).min(self.curve.len() - 1);
        self.value * self.curve[index]
    }
}

impl From<f32> for ScalableFloat {
    fn from(value: f32) -> Self {
        Self::constant(value)
    }
}

/// Whose attributes an attribute-based magnitude reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CaptureSource {
    /// Snapshot taken when the spec was created.
    Source,
    /// Live value on the target at application time.
    Target,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModifierMagnitude {
    Scalable(ScalableFloat),
    /// `coefficient × (attribute + pre_add) + post_add`
    AttributeBased {
        attribute: AttributeKind,
        capture: CaptureSource,
        coefficient: f32,
        pre_add: f32,
        post_add: f32,
    },
    /// Supplied by whoever built the spec.
    SetByCaller(GameplayTag),
}

impl ModifierMagnitude {
    pub fn evaluate(&self, spec: &EffectSpec, target: &AttributeSet) -> f32 {
        match self {
            Self::Scalable(value) => value.evaluate(spec.level()),
            Self::AttributeBased {
                attribute,
                capture,
                coefficient,
                pre_add,
                post_add,
            } => {
                let captured = match capture {
                    CaptureSource::Source => spec.captured_source().get(*attribute),
                    CaptureSource::Target => target.current(*attribute),
                };
                coefficient * (captured + pre_add) + post_add
            }
            Self::SetByCaller(tag) => spec.set_by_caller(tag).unwrap_or_else(|| {
                warn!(effect = %spec.definition().id, %tag, "set-by-caller magnitude missing, using 0");
                0.0
            }),
        }
    }
}

impl From<f32> for ModifierMagnitude {
    fn from(value: f32) -> Self {
        Self::Scalable(ScalableFloat::constant(value))
    }
}
