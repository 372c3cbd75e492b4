//! Per-character attribute storage with the pre-change and post-execute hooks.

use arrayvec::ArrayVec;

use super::aggregator::{AttributeModifier, ModifierOp, aggregate};
use super::kind::{AttributeFields, AttributeKind};
use crate::effect::{ActiveEffectHandle, DamageAttribution, EffectSpec};
use crate::entity::EntityId;
use crate::targeting::HitResult;
use crate::tag::TagContainer;

/// Base and current value of one attribute.
///
/// `base` is the permanent value changed by instant effects, `current` is the
/// base with every live modifier folded in.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeValue {
    pub base: f32,
    pub current: f32,
}

impl AttributeValue {
    pub const fn new(value: f32) -> Self {
        Self {
            base: value,
            current: value,
        }
    }
}

/// Read-only copy of every current value, taken when an effect spec is built.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeSnapshot {
    values: [f32; AttributeKind::COUNT],
}

impl AttributeSnapshot {
    pub fn get(&self, kind: AttributeKind) -> f32 {
        self.values[kind.index()]
    }
}

/// A single modifier that an effect execution just committed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExecutedModifier {
    pub attribute: AttributeKind,
    pub op: ModifierOp,
    pub magnitude: f32,
}

/// Damage taken by the owner of an attribute set.
#[derive(Clone, Debug, PartialEq)]
pub struct DamageEvent {
    pub amount: f32,
    pub hit: Option<HitResult>,
    pub tags: TagContainer,
    pub instigator: Option<EntityId>,
    pub causer: Option<EntityId>,
}

/// Notification produced by the post-execute hook.
///
/// Deltas are only meaningful for additive modifiers; overrides report `0.0`.
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeEvent {
    Damaged(DamageEvent),
    HealthChanged { delta: f32, tags: TagContainer },
    ManaChanged { delta: f32, tags: TagContainer },
    MoveSpeedChanged { delta: f32, tags: TagContainer },
}

/// Events raised by one post-execute call. Damage raises two.
pub type AttributeEvents = ArrayVec<AttributeEvent, 2>;

/// The attributes of one character.
///
/// Every write to a current value runs the pre-change hook, which clamps
/// capped attributes into `[0, max]` and rescales the capped attribute when
/// its max changes. The only exception is [`AttributeSet::apply_unsafe_additive`].
#[derive(Clone, Debug)]
pub struct AttributeSet {
    values: [AttributeValue; AttributeKind::COUNT],
    modifiers: [Vec<AttributeModifier>; AttributeKind::COUNT],
}

impl Default for AttributeSet {
    fn default() -> Self {
        Self::new()
    }
}

impl AttributeSet {
    pub fn new() -> Self {
        Self {
            values: AttributeKind::ALL.map(|kind| AttributeValue::new(kind.default_value())),
            modifiers: Default::default(),
        }
    }

    /// Sets an initial value without running any hook.
    ///
    /// Only meant for building a character before it enters play.
    #[must_use]
    pub fn with_base(mut self, kind: AttributeKind, value: f32) -> Self {
        self.values[kind.index()] = AttributeValue::new(value);
        self
    }

    pub fn value(&self, kind: AttributeKind) -> AttributeValue {
        self.values[kind.index()]
    }

    pub fn base(&self, kind: AttributeKind) -> f32 {
        self.values[kind.index()].base
    }

    pub fn current(&self, kind: AttributeKind) -> f32 {
        self.values[kind.index()].current
    }

    /// Current value of the cap for a capped attribute.
    pub fn max(&self, kind: AttributeKind) -> Option<f32> {
        kind.cap().map(|cap| self.current(cap))
    }

    pub fn health(&self) -> f32 {
        self.current(AttributeKind::Health)
    }

    pub fn max_health(&self) -> f32 {
        self.current(AttributeKind::MaxHealth)
    }

    pub fn mana(&self) -> f32 {
        self.current(AttributeKind::Mana)
    }

    pub fn max_mana(&self) -> f32 {
        self.current(AttributeKind::MaxMana)
    }

    pub fn move_speed(&self) -> f32 {
        self.current(AttributeKind::MoveSpeed)
    }

    pub fn snapshot(&self) -> AttributeSnapshot {
        AttributeSnapshot {
            values: self.values.map(|value| value.current),
        }
    }

    pub fn modifiers(&self, kind: AttributeKind) -> &[AttributeModifier] {
        &self.modifiers[kind.index()]
    }

    /// Replaces the base value and recomputes the current value.
    pub fn set_base(&mut self, kind: AttributeKind, value: f32) -> AttributeFields {
        let slot = &mut self.values[kind.index()];
        let changed = if slot.base != value {
            kind.field()
        } else {
            AttributeFields::empty()
        };
        slot.base = value;
        changed | self.recompute(kind)
    }

    /// Folds an instant modifier into the base value.
    pub fn apply_base_mod(&mut self, kind: AttributeKind, op: ModifierOp, magnitude: f32) -> AttributeFields {
        let value = op.apply(self.base(kind), magnitude);
        self.set_base(kind, value)
    }

    /// Additive path used by the effect pipeline.
    pub fn apply_delta(&mut self, kind: AttributeKind, amount: f32) -> AttributeFields {
        self.apply_base_mod(kind, ModifierOp::Additive, amount)
    }

    /// Adds `amount` to the base value and refreshes the current value with no
    /// hook at all. Reserved for rescaling a capped attribute while its max is
    /// being replaced.
    pub fn apply_unsafe_additive(&mut self, kind: AttributeKind, amount: f32) {
        let idx = kind.index();
        self.values[idx].base += amount;
        self.values[idx].current = aggregate(self.values[idx].base, &self.modifiers[idx]);
    }

    pub fn add_modifier(&mut self, kind: AttributeKind, modifier: AttributeModifier) -> AttributeFields {
        self.modifiers[kind.index()].push(modifier);
        self.recompute(kind)
    }

    /// Drops every modifier contributed by `source` and recomputes what it touched.
    pub fn remove_modifiers(&mut self, source: ActiveEffectHandle) -> AttributeFields {
        let mut changed = AttributeFields::empty();
        for kind in AttributeKind::ALL {
            let list = &mut self.modifiers[kind.index()];
            let before = list.len();
            list.retain(|m| m.source != source);
            if list.len() != before {
                changed |= self.recompute(kind);
            }
        }
        changed
    }

    fn recompute(&mut self, kind: AttributeKind) -> AttributeFields {
        let value = aggregate(self.base(kind), self.modifiers(kind));
        self.set_current(kind, value)
    }

    fn set_current(&mut self, kind: AttributeKind, mut value: f32) -> AttributeFields {
        let mut changed = self.pre_attribute_change(kind, &mut value);
        let slot = &mut self.values[kind.index()];
        if slot.current != value {
            changed |= kind.field();
        }
        slot.current = value;
        changed
    }

    /// Runs before a current value is stored.
    fn pre_attribute_change(&mut self, kind: AttributeKind, value: &mut f32) -> AttributeFields {
        if let Some(capped) = kind.capped() {
            return self.adjust_for_max_change(capped, kind, *value);
        }
        if let Some(cap) = kind.cap() {
            *value = clamp_to_cap(*value, self.current(cap));
        }
        AttributeFields::empty()
    }

    /// Keeps `affected / max` constant while `max` moves to `new_max`.
    fn adjust_for_max_change(
        &mut self,
        affected: AttributeKind,
        max: AttributeKind,
        new_max: f32,
    ) -> AttributeFields {
        let old_max = self.current(max);
        if (old_max - new_max).abs() <= f32::EPSILON {
            return AttributeFields::empty();
        }

        let current = self.current(affected);
        let delta = if old_max > 0.0 {
            current * new_max / old_max - current
        } else {
            new_max - current
        };
        self.apply_unsafe_additive(affected, delta);
        affected.field()
    }

    /// Runs after an instant modifier was committed by the effect pipeline.
    pub fn post_effect_execute(
        &mut self,
        spec: &EffectSpec,
        executed: ExecutedModifier,
    ) -> (AttributeFields, AttributeEvents) {
        let mut changed = AttributeFields::empty();
        let mut events = AttributeEvents::new();
        let tags = spec.source_tags().clone();
        let delta = if executed.op == ModifierOp::Additive {
            executed.magnitude
        } else {
            0.0
        };

        match executed.attribute {
            AttributeKind::Damage => {
                let damage = self.current(AttributeKind::Damage);
                changed |= self.set_base(AttributeKind::Damage, 0.0);

                if damage > 0.0 {
                    let health = self.health() - damage;
                    changed |= self.set_base(
                        AttributeKind::Health,
                        clamp_to_cap(health, self.max_health()),
                    );

                    let attribution = DamageAttribution::resolve(spec.context());
                    events.push(AttributeEvent::Damaged(DamageEvent {
                        amount: damage,
                        hit: spec.context().hit_result.clone(),
                        tags: tags.clone(),
                        instigator: attribution.instigator,
                        causer: attribution.causer,
                    }));
                    events.push(AttributeEvent::HealthChanged {
                        delta: -damage,
                        tags,
                    });
                }
            }
            AttributeKind::Health => {
                changed |= self.set_base(
                    AttributeKind::Health,
                    clamp_to_cap(self.health(), self.max_health()),
                );
                events.push(AttributeEvent::HealthChanged { delta, tags });
            }
            AttributeKind::Mana => {
                changed |= self.set_base(
                    AttributeKind::Mana,
                    clamp_to_cap(self.mana(), self.max_mana()),
                );
                events.push(AttributeEvent::ManaChanged { delta, tags });
            }
            AttributeKind::MoveSpeed => {
                events.push(AttributeEvent::MoveSpeedChanged { delta, tags });
            }
            _ => {}
        }

        (changed, events)
    }
}

fn clamp_to_cap(value: f32, cap: f32) -> f32 {
    value.clamp(0.0, cap.max(0.0))
}
