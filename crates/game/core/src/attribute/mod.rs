//! Attribute store.
//!
//! Each character owns one [`AttributeSet`]. Values are split into a base value
//! (changed permanently by instant effects) and a current value (base plus
//! every live modifier). Capped attributes (Health, Mana) are kept in
//! `[0, max]`, and changing a max rescales the capped value proportionally.
//!
//! The set is only mutated by the effect pipeline; the single unguarded entry
//! point is [`AttributeSet::apply_unsafe_additive`], used while rescaling.

mod aggregator;
mod kind;
mod set;

pub use aggregator::{AttributeModifier, ModifierOp, aggregate};
pub use kind::{AttributeFields, AttributeKind};
pub use set::{
    AttributeEvent, AttributeEvents, AttributeSet, AttributeSnapshot, AttributeValue, DamageEvent,
    ExecutedModifier,
};
