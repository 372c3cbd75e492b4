//! Item descriptions.

use std::fmt;
use std::sync::Arc;

use crate::ability::AbilityDefinition;

/// Primary item categories. Slots are allocated per type.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum ItemType {
    Potion,
    Skill,
    Token,
    Weapon,
}

/// Stable `(type, name)` identifier of an item description.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemId {
    pub item_type: ItemType,
    pub name: String,
}

impl ItemId {
    pub fn new(item_type: ItemType, name: impl Into<String>) -> Self {
        Self {
            item_type,
            name: name.into(),
        }
    }
}

/// Renders as `Type:Name`.
impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.item_type, self.name)
    }
}

/// Static description of an item. Never mutated at runtime.
#[derive(Clone, Debug)]
pub struct ItemDefinition {
    pub id: ItemId,
    pub display_name: String,
    pub description: String,
    pub price: i32,
    /// `<= 0` means unlimited.
    pub max_count: i32,
    /// `<= 0` means unlimited.
    pub max_level: i32,
    pub granted_ability: Option<Arc<AbilityDefinition>>,
    /// Level of the granted ability for weapons. `<= 0` means character level.
    pub ability_level: i32,
    pub linked_item: Option<ItemId>,
}

impl ItemDefinition {
    pub fn new(item_type: ItemType, name: impl Into<String>) -> Self {
        let id = ItemId::new(item_type, name);
        Self {
            display_name: id.name.clone(),
            id,
            description: String::new(),
            price: 0,
            max_count: 1,
            max_level: 1,
            granted_ability: None,
            ability_level: 1,
            linked_item: None,
        }
    }

    #[must_use]
    pub fn with_max_count(mut self, max_count: i32) -> Self {
        self.max_count = max_count;
        self
    }

    #[must_use]
    pub fn with_max_level(mut self, max_level: i32) -> Self {
        self.max_level = max_level;
        self
    }

    #[must_use]
    pub fn with_price(mut self, price: i32) -> Self {
        self.price = price;
        self
    }

    #[must_use]
    pub fn granting(mut self, ability: Arc<AbilityDefinition>, ability_level: i32) -> Self {
        self.granted_ability = Some(ability);
        self.ability_level = ability_level;
        self
    }

    #[must_use]
    pub fn linked_to(mut self, item: ItemId) -> Self {
        self.linked_item = Some(item);
        self
    }

    pub fn item_type(&self) -> ItemType {
        self.id.item_type
    }

    /// Consumables have no count limit.
    pub fn is_consumable(&self) -> bool {
        self.max_count <= 0
    }

    pub fn identifier_string(&self) -> String {
        self.id.to_string()
    }

    /// Level to grant this item's ability at.
    ///
    /// Weapons carry their own ability level; every other item type follows
    /// the character.
    pub fn granted_ability_level(&self, character_level: u32) -> u32 {
        if self.item_type() == ItemType::Weapon && self.ability_level > 0 {
            self.ability_level as u32
        } else {
            character_level
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_is_type_and_name() {
        let sword = ItemDefinition::new(ItemType::Weapon, "Sword");
        assert_eq!(sword.identifier_string(), "Weapon:Sword");
        assert_eq!("weapon".parse::<ItemType>().ok(), Some(ItemType::Weapon));
    }

    #[test]
    fn only_weapons_override_ability_level() {
        let ability = Arc::new(AbilityDefinition::new("GA_Slash"));
        let sword = ItemDefinition::new(ItemType::Weapon, "Sword").granting(ability.clone(), 4);
        let scroll = ItemDefinition::new(ItemType::Skill, "Fireball").granting(ability.clone(), 4);
        let blunt = ItemDefinition::new(ItemType::Weapon, "Club").granting(ability, 0);

        assert_eq!(sword.granted_ability_level(2), 4);
        assert_eq!(scroll.granted_ability_level(2), 2);
        assert_eq!(blunt.granted_ability_level(2), 2);
    }

    #[test]
    fn unlimited_count_marks_consumable() {
        assert!(ItemDefinition::new(ItemType::Potion, "Health").with_max_count(0).is_consumable());
        assert!(!ItemDefinition::new(ItemType::Token, "Souls").is_consumable());
    }
}
