//! Effect application pipeline.
//!
//! Applying a spec to a target follows a fixed sequence:
//!
//! 1. **Instant**: every authored modifier, then every execution output, is
//!    evaluated and folded into the base value (pre-change hook runs inside the
//!    store), then the post-execute hook runs for that modifier. Modifiers are
//!    committed in authoring order and nothing is rolled back.
//! 2. **Duration / Infinite**: the effect is registered, and each modifier is
//!    evaluated once and added as a live modifier on the current value.
//! 3. **Periodic**: the effect is registered, and its modifiers execute like an
//!    instant effect on application and on every elapsed period.

use tracing::debug;

use super::active::{ActiveEffect, ActiveEffectHandle, ActiveEffectsContainer, EffectQuery};
use super::execution::run_execution;
use super::spec::EffectSpec;
use crate::attribute::{
    AttributeEvent, AttributeFields, AttributeModifier, AttributeSet, ExecutedModifier,
};

/// Mutable view of the character an effect lands on.
pub struct EffectTarget<'a> {
    pub attributes: &'a mut AttributeSet,
    pub effects: &'a mut ActiveEffectsContainer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplicationKind {
    /// Committed immediately; the handle is only an audit record.
    Executed,
    /// Registered in the active effect container.
    Registered,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EffectApplication {
    pub handle: ActiveEffectHandle,
    pub kind: ApplicationKind,
    pub changed: AttributeFields,
    pub events: Vec<AttributeEvent>,
}

/// Outcome of advancing time on one character.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickOutcome {
    pub expired: Vec<ActiveEffectHandle>,
    pub changed: AttributeFields,
    pub events: Vec<AttributeEvent>,
}

pub fn apply_effect_spec(spec: &EffectSpec, target: EffectTarget<'_>, now: f32) -> EffectApplication {
    let handle = target.effects.allocate_handle();
    let definition = spec.definition();

    if definition.is_instant() {
        let (changed, events) = execute_spec(spec, target.attributes);
        debug!(%handle, effect = %definition.id, ?changed, "executed instant effect");
        return EffectApplication {
            handle,
            kind: ApplicationKind::Executed,
            changed,
            events,
        };
    }

    let mut changed = AttributeFields::empty();
    let mut events = Vec::new();
    let mut next_execution = None;

    if let Some(period) = definition.period.filter(|_| definition.is_periodic()) {
        let (executed, raised) = execute_spec(spec, target.attributes);
        changed |= executed;
        events = raised;
        next_execution = Some(now + period);
    } else {
        for info in &definition.modifiers {
            let magnitude = info.magnitude.evaluate(spec, target.attributes);
            changed |= target.attributes.add_modifier(
                info.attribute,
                AttributeModifier::new(handle, info.op, magnitude),
            );
        }
    }

    target.effects.insert(ActiveEffect {
        handle,
        spec: spec.clone(),
        start_time: now,
        duration: spec.duration(),
        next_execution,
    });
    debug!(%handle, effect = %definition.id, duration = ?spec.duration(), "registered active effect");

    EffectApplication {
        handle,
        kind: ApplicationKind::Registered,
        changed,
        events,
    }
}

/// Commits every modifier of `spec` into base values and runs the
/// post-execute hook after each one.
pub fn execute_spec(spec: &EffectSpec, attributes: &mut AttributeSet) -> (AttributeFields, Vec<AttributeEvent>) {
    let definition = spec.definition();
    let mut changed = AttributeFields::empty();
    let mut events = Vec::new();

    for info in &definition.modifiers {
        let executed = ExecutedModifier {
            attribute: info.attribute,
            op: info.op,
            magnitude: info.magnitude.evaluate(spec, attributes),
        };
        commit(spec, attributes, executed, &mut changed, &mut events);
    }

    for execution in &definition.executions {
        if let Some(executed) = run_execution(execution, spec, attributes) {
            commit(spec, attributes, executed, &mut changed, &mut events);
        }
    }

    (changed, events)
}

fn commit(
    spec: &EffectSpec,
    attributes: &mut AttributeSet,
    executed: ExecutedModifier,
    changed: &mut AttributeFields,
    events: &mut Vec<AttributeEvent>,
) {
    *changed |= attributes.apply_base_mod(executed.attribute, executed.op, executed.magnitude);
    let (post_changed, raised) = attributes.post_effect_execute(spec, executed);
    *changed |= post_changed;
    events.extend(raised);
}

/// Removes one active effect and its live modifiers.
pub fn remove_active_effect(handle: ActiveEffectHandle, target: EffectTarget<'_>) -> Option<AttributeFields> {
    let effect = target.effects.take(handle)?;
    debug!(%handle, effect = %effect.spec.definition().id, "removed active effect");
    Some(target.attributes.remove_modifiers(handle))
}

/// Removes every active effect matched by `query`. Returns how many were removed.
pub fn remove_matching(query: &EffectQuery, target: EffectTarget<'_>) -> usize {
    let handles = target.effects.matching(query);
    for &handle in &handles {
        if target.effects.take(handle).is_some() {
            target.attributes.remove_modifiers(handle);
        }
    }
    handles.len()
}

/// Runs due periodic executions, then drops expired effects.
pub fn tick_effects(target: EffectTarget<'_>, now: f32) -> TickOutcome {
    let mut outcome = TickOutcome::default();

    for effect in target.effects.iter_mut() {
        let Some(period) = effect.spec.definition().period.filter(|p| *p > 0.0) else {
            continue;
        };
        let end = effect.end_time();
        while let Some(due) = effect.next_execution {
            if due > now || end.is_some_and(|end| due > end) {
                break;
            }
            let (changed, events) = execute_spec(&effect.spec, target.attributes);
            outcome.changed |= changed;
            outcome.events.extend(events);
            effect.next_execution = Some(due + period);
        }
    }

    for handle in target.effects.expired(now) {
        if target.effects.take(handle).is_some() {
            outcome.changed |= target.attributes.remove_modifiers(handle);
            debug!(%handle, "active effect expired");
            outcome.expired.push(handle);
        }
    }

    outcome
}
