//! Modifier aggregation.
//!
//! Active (duration-based) modifiers never touch the base value. The current
//! value is recomputed from the base and every live modifier in a fixed order:
//!
//! ```text
//! current = ((base + Σ additive) × Π multiplicative) / Π division
//! current = last override, if any
//! ```
//!
//! Instant effects instead fold a single operation into the base value with
//! [`ModifierOp::apply`].

use crate::effect::ActiveEffectHandle;

/// Operation a modifier performs on its attribute.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ModifierOp {
    Additive,
    Multiplicative,
    Division,
    Override,
}

impl ModifierOp {
    /// Folds `magnitude` into `value`. Division by zero leaves the value untouched.
    pub fn apply(self, value: f32, magnitude: f32) -> f32 {
        match self {
            Self::Additive => value + magnitude,
            Self::Multiplicative => value * magnitude,
            Self::Division if magnitude == 0.0 => value,
            Self::Division => value / magnitude,
            Self::Override => magnitude,
        }
    }
}

/// A live modifier contributed by an active effect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttributeModifier {
    pub source: ActiveEffectHandle,
    pub op: ModifierOp,
    pub magnitude: f32,
}

impl AttributeModifier {
    pub fn new(source: ActiveEffectHandle, op: ModifierOp, magnitude: f32) -> Self {
        Self {
            source,
            op,
            magnitude,
        }
    }
}

/// Computes the current value of an attribute from its base value.
pub fn aggregate(base: f32, modifiers: &[AttributeModifier]) -> f32 {
    if modifiers.is_empty() {
        return base;
    }

    let additive: f32 = modifiers
        .iter()
        .filter(|m| m.op == ModifierOp::Additive)
        .map(|m| m.magnitude)
        .sum();

    let multiplied = modifiers
        .iter()
        .filter(|m| m.op == ModifierOp::Multiplicative)
        .fold(base + additive, |acc, m| acc * m.magnitude);

    let divided = modifiers
        .iter()
        .filter(|m| m.op == ModifierOp::Division && m.magnitude != 0.0)
        .fold(multiplied, |acc, m| acc / m.magnitude);

    modifiers
        .iter()
        .rev()
        .find(|m| m.op == ModifierOp::Override)
        .map_or(divided, |m| m.magnitude)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modifier(op: ModifierOp, magnitude: f32) -> AttributeModifier {
        AttributeModifier::new(ActiveEffectHandle::new(1), op, magnitude)
    }

    #[test]
    fn aggregate_order_is_add_then_multiply_then_divide() {
        let mods = [
            modifier(ModifierOp::Multiplicative, 2.0),
            modifier(ModifierOp::Additive, 5.0),
            modifier(ModifierOp::Division, 4.0),
            modifier(ModifierOp::Additive, 1.0),
        ];
        // ((10 + 5 + 1) × 2) / 4 = 8
        assert_eq!(aggregate(10.0, &mods), 8.0);
    }

    #[test]
    fn last_override_wins() {
        let mods = [
            modifier(ModifierOp::Override, 3.0),
            modifier(ModifierOp::Additive, 100.0),
            modifier(ModifierOp::Override, 7.0),
        ];
        assert_eq!(aggregate(10.0, &mods), 7.0);
    }

    #[test]
    fn division_by_zero_is_ignored() {
        assert_eq!(ModifierOp::Division.apply(9.0, 0.0), 9.0);
        assert_eq!(aggregate(9.0, &[modifier(ModifierOp::Division, 0.0)]), 9.0);
    }

    #[test]
    fn base_fold_matches_operation() {
        assert_eq!(ModifierOp::Additive.apply(2.0, -5.0), -3.0);
        assert_eq!(ModifierOp::Multiplicative.apply(2.0, 1.5), 3.0);
        assert_eq!(ModifierOp::Override.apply(2.0, 42.0), 42.0);
    }
}
