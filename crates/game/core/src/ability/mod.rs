//! Ability grant table, activation state machine and effect containers.
//!
//! Abilities are granted to a character as [`AbilitySpec`]s (definition, level,
//! granting source). Activation walks the state machine documented on
//! [`AbilityState`]; running activations are identified by
//! [`ActivationToken`]s. Effect containers map an event tag to a targeting
//! rule and a list of effects, and are turned into an
//! [`EffectContainerSpec`] per activation step.

mod container;
mod definition;
mod error;
mod spec;
mod system;

pub use container::EffectContainerSpec;
pub use definition::{AbilityDefinition, AbilityId, EffectContainer, InstancingPolicy};
pub use error::ActivationError;
pub use spec::{
    AbilityInstance, AbilitySpec, AbilitySpecHandle, AbilityState, ActivationToken, InstanceId,
    InstanceState,
};
pub use system::{AbilitySystem, ClearOutcome, EndOutcome, unaffordable_cost};
