//! Authored records that reference other content by id.
//!
//! Effects deserialize straight into [`EffectDefinition`]. Abilities, items
//! and characters point at effects and abilities by id, so they are authored
//! as templates and resolved into shared definitions by
//! [`ContentLibrary`](crate::ContentLibrary).

use std::collections::BTreeMap;

use arpg_core::{
    AbilityId, AttributeKind, EffectId, GameplayTag, InstancingPolicy, ItemId, ItemSlot, ItemType,
    TagContainer, TargetType,
};

/// Built-in targeting rules that can be named in data files.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetTypeSpec {
    UseOwner,
    UseEventData,
}

impl From<TargetTypeSpec> for TargetType {
    fn from(spec: TargetTypeSpec) -> Self {
        match spec {
            TargetTypeSpec::UseOwner => TargetType::UseOwner,
            TargetTypeSpec::UseEventData => TargetType::UseEventData,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContainerTemplate {
    #[cfg_attr(feature = "serde", serde(default))]
    pub target_type: Option<TargetTypeSpec>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub effects: Vec<EffectId>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityTemplate {
    pub id: AbilityId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub ability_tags: TagContainer,
    #[cfg_attr(feature = "serde", serde(default))]
    pub activation_blocked_tags: TagContainer,
    #[cfg_attr(feature = "serde", serde(default))]
    pub activation_required_tags: TagContainer,
    #[cfg_attr(feature = "serde", serde(default))]
    pub cost: Option<EffectId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub cooldown: Option<EffectId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub instancing: InstancingPolicy,
    /// Keyed by the gameplay event that triggers the container.
    #[cfg_attr(feature = "serde", serde(default))]
    pub effect_containers: BTreeMap<GameplayTag, ContainerTemplate>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemTemplate {
    pub item_type: ItemType,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub display_name: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub price: i32,
    #[cfg_attr(feature = "serde", serde(default = "one"))]
    pub max_count: i32,
    #[cfg_attr(feature = "serde", serde(default = "one"))]
    pub max_level: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub ability: Option<AbilityId>,
    #[cfg_attr(feature = "serde", serde(default = "one"))]
    pub ability_level: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub linked_item: Option<ItemId>,
}

impl ItemTemplate {
    pub fn id(&self) -> ItemId {
        ItemId::new(self.item_type, self.name.clone())
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharacterTemplate {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default = "level_one"))]
    pub level: u32,
    /// Base values; attributes not listed keep their defaults.
    #[cfg_attr(feature = "serde", serde(default))]
    pub attributes: BTreeMap<AttributeKind, f32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub startup_abilities: Vec<AbilityId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub passive_effects: Vec<EffectId>,
    /// Abilities bound to a slot while no slotted item grants one.
    #[cfg_attr(feature = "serde", serde(default))]
    pub slot_abilities: Vec<(ItemSlot, AbilityId)>,
}

#[cfg(feature = "serde")]
fn one() -> i32 {
    1
}

#[cfg(feature = "serde")]
fn level_one() -> u32 {
    1
}
