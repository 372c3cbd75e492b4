//! Effect definitions, specs and the application pipeline.
//!
//! An [`EffectDefinition`] is authored data. Binding it to a level and a
//! source context yields an [`EffectSpec`], which captures the source's
//! attributes and tags at creation time. Specs are applied to a target through
//! [`apply_effect_spec`], which either commits them immediately (instant
//! effects) or registers them in the target's [`ActiveEffectsContainer`].

mod active;
mod context;
mod definition;
mod execution;
mod magnitude;
mod pipeline;
mod spec;

pub use active::{
    ActiveEffect, ActiveEffectHandle, ActiveEffectsContainer, EffectQuery, EffectTiming,
};
pub use context::{DamageAttribution, EffectContext};
pub use definition::{DurationPolicy, EffectDefinition, EffectExecution, EffectId, ModifierInfo};
pub use execution::run_execution;
pub use magnitude::{CaptureSource, ModifierMagnitude, ScalableFloat};
pub use pipeline::{
    ApplicationKind, EffectApplication, EffectTarget, TickOutcome, apply_effect_spec,
    execute_spec, remove_active_effect, remove_matching, tick_effects,
};
pub use spec::EffectSpec;
