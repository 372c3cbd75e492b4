//! Deterministic gameplay rules for an action RPG.
//!
//! `arpg-core` defines the attribute store, the effect application pipeline,
//! ability activation and targeting, the inventory and slot manager, and the
//! versioned save record. Everything here is synchronous and owned by a single
//! logical thread; persistence I/O and scheduling live in `arpg-runtime`.
//! Each [`character::Character`] is the only writer of its own state, and
//! [`world::World`] routes cross-character effect application.
pub mod ability;
pub mod attribute;
pub mod character;
pub mod config;
pub mod effect;
pub mod entity;
pub mod error;
pub mod events;
pub mod inventory;
pub mod save;
pub mod tag;
pub mod targeting;
pub mod world;

pub use ability::{
    AbilityDefinition, AbilityId, AbilitySpec, AbilitySpecHandle, AbilityState, AbilitySystem,
    ActivationError, ActivationToken, EffectContainer, EffectContainerSpec, InstancingPolicy,
};
pub use attribute::{
    AttributeEvent, AttributeFields, AttributeKind, AttributeModifier, AttributeSet,
    AttributeValue, DamageEvent, ModifierOp,
};
pub use character::{Character, CharacterEvent, ReconcileMode, ReconcileReport};
pub use config::{DefaultItem, GameConfig, SlotAllocation};
pub use effect::{
    ActiveEffectHandle, DurationPolicy, EffectContext, EffectDefinition, EffectExecution,
    EffectId, EffectSpec, EffectTiming, ModifierMagnitude, ScalableFloat,
};
pub use entity::{ActorInfo, ControllerId, ControllerInfo, EntityId, SourceObject};
pub use error::{ErrorSeverity, GameError};
pub use events::{EventListeners, ListenerId};
pub use inventory::{
    Inventory, InventoryEvent, InventoryRecord, InventorySnapshot, InventorySource, ItemCatalog,
    ItemDefinition, ItemId, ItemRegistry, ItemSlot, ItemType, SaveSink,
};
pub use save::{SaveRecord, SaveVersion};
pub use tag::{GameplayTag, TagContainer};
pub use targeting::{
    GameplayEventData, HitResult, TargetData, TargetDataHandle, TargetType, TargetingRule,
};
pub use world::World;
