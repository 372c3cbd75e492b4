//! Custom execution calculations.

use super::definition::EffectExecution;
use super::spec::EffectSpec;
use crate::attribute::{AttributeKind, AttributeSet, ExecutedModifier, ModifierOp};

/// Runs one execution and returns the modifiers it wants committed.
pub fn run_execution(
    execution: &EffectExecution,
    spec: &EffectSpec,
    target: &AttributeSet,
) -> Option<ExecutedModifier> {
    match execution {
        EffectExecution::Damage { base_damage } => {
            let base = base_damage.evaluate(spec.level());
            let attack = spec.captured_source().get(AttributeKind::AttackPower);
            let mut defense = target.current(AttributeKind::DefensePower);
            if defense == 0.0 {
                defense = 1.0;
            }

            let damage = base * attack / defense;
            (damage > 0.0).then_some(ExecutedModifier {
                attribute: AttributeKind::Damage,
                op: ModifierOp::Additive,
                magnitude: damage,
            })
        }
    }
}
