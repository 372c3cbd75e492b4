//! Data-driven content definitions and loaders.
//!
//! This crate loads static game content from RON/TOML data files:
//! - Game configuration: slot layout and default inventory (TOML)
//! - Effect definitions (RON)
//! - Ability templates referencing effects by id (RON)
//! - Item catalogs referencing abilities by id (RON)
//! - Character templates (RON)
//!
//! Loaded content is cross-linked into a [`ContentLibrary`] of shared
//! definitions. Content is read by the runtime and never appears in saves.

pub mod templates;

#[cfg(feature = "loaders")]
pub mod library;
#[cfg(feature = "loaders")]
pub mod loaders;

pub use templates::{
    AbilityTemplate, CharacterTemplate, ContainerTemplate, ItemTemplate, TargetTypeSpec,
};

#[cfg(feature = "loaders")]
pub use library::ContentLibrary;
#[cfg(feature = "loaders")]
pub use loaders::{
    AbilityLoader, CharacterLoader, ConfigLoader, ContentFactory, EffectLoader, ItemLoader,
    LoadResult,
};
