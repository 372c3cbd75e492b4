use std::collections::BTreeMap;

use crate::inventory::{InventoryRecord, ItemId, ItemSlot, ItemType};

/// Number of equipment slots available for one item type.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlotAllocation {
    pub item_type: ItemType,
    pub count: u32,
}

/// An item every new save starts with.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DefaultItem {
    pub item: ItemId,
    pub count: i32,
    pub level: i32,
}

/// Game configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameConfig {
    /// Equipment slots created per item type. Slot numbers run `0..count`.
    pub item_slots: Vec<SlotAllocation>,
    /// Merged into every loaded save when missing, and used to seed new saves.
    #[cfg_attr(feature = "serde", serde(default))]
    pub default_inventory: Vec<DefaultItem>,
}

impl GameConfig {
    // ===== compile-time constants used as type parameters =====
    /// Concurrent instances of one `InstancedPerExecution` ability.
    pub const MAX_ABILITY_INSTANCES: usize = 8;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_SLOTS_PER_TYPE: u32 = 1;

    pub fn new() -> Self {
        Self {
            item_slots: [ItemType::Weapon, ItemType::Skill, ItemType::Potion]
                .into_iter()
                .map(|item_type| SlotAllocation {
                    item_type,
                    count: Self::DEFAULT_SLOTS_PER_TYPE,
                })
                .collect(),
            default_inventory: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_slots(mut self, item_type: ItemType, count: u32) -> Self {
        self.item_slots.retain(|slot| slot.item_type != item_type);
        self.item_slots.push(SlotAllocation { item_type, count });
        self
    }

    #[must_use]
    pub fn with_default_item(mut self, item: ItemId, count: i32, level: i32) -> Self {
        self.default_inventory.push(DefaultItem { item, count, level });
        self
    }

    pub fn slots_per_type(&self) -> BTreeMap<ItemType, u32> {
        self.item_slots
            .iter()
            .map(|slot| (slot.item_type, slot.count))
            .collect()
    }

    pub fn is_valid_item_slot(&self, slot: &ItemSlot) -> bool {
        slot.slot_number >= 0
            && self
                .slots_per_type()
                .get(&slot.item_type)
                .is_some_and(|&count| (slot.slot_number as u32) < count)
    }

    pub fn default_inventory_map(&self) -> BTreeMap<ItemId, InventoryRecord> {
        self.default_inventory
            .iter()
            .map(|entry| {
                (
                    entry.item.clone(),
                    InventoryRecord::new(entry.count, entry.level),
                )
            })
            .collect()
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_validity_follows_allocation() {
        let config = GameConfig::new().with_slots(ItemType::Skill, 3);
        assert!(config.is_valid_item_slot(&ItemSlot::new(ItemType::Skill, 2)));
        assert!(!config.is_valid_item_slot(&ItemSlot::new(ItemType::Skill, 3)));
        assert!(!config.is_valid_item_slot(&ItemSlot::new(ItemType::Skill, -1)));
        assert!(!config.is_valid_item_slot(&ItemSlot::new(ItemType::Token, 0)));
        assert_eq!(config.slots_per_type().get(&ItemType::Skill), Some(&3));
    }
}
