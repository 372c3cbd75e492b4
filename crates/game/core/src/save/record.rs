//! Versioned persistent record of one player's inventory.

use std::collections::BTreeMap;

use crate::inventory::{InventoryRecord, InventorySnapshot, ItemId, ItemSlot};

/// Save format revisions, in order.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
#[repr(u32)]
pub enum SaveVersion {
    /// Only a flat list of owned item ids.
    Initial = 0,
    /// Inventory map of counts and levels.
    AddedInventory = 1,
    /// Inventory map plus slot contents.
    #[default]
    AddedItemData = 2,
}

impl SaveVersion {
    pub const LATEST: Self = Self::AddedItemData;
}

/// Inventory counts, slot contents and the owning user.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SaveRecord {
    pub version: SaveVersion,
    pub inventory: BTreeMap<ItemId, InventoryRecord>,
    pub slots: BTreeMap<ItemSlot, Option<ItemId>>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub user_id: String,
    /// Item ids from `Initial` saves, folded into `inventory` by [`Self::migrate`].
    #[cfg_attr(feature = "serde", serde(default))]
    pub legacy_items: Vec<ItemId>,
}

impl SaveRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upgrades an older record in place.
    ///
    /// Legacy item ids become `(count 1, level 1)` entries unless the item is
    /// already present. Running it twice is a no-op.
    pub fn migrate(&mut self) -> bool {
        if self.version >= SaveVersion::LATEST && self.legacy_items.is_empty() {
            return false;
        }
        for id in self.legacy_items.drain(..) {
            self.inventory
                .entry(id)
                .or_insert(InventoryRecord::new(1, 1));
        }
        self.version = SaveVersion::LATEST;
        true
    }

    /// Adds every default item the record does not have yet.
    ///
    /// With `remove_extra` the inventory is cleared first, leaving exactly the
    /// defaults. Existing counts are never lowered.
    pub fn add_default_inventory(
        &mut self,
        defaults: &BTreeMap<ItemId, InventoryRecord>,
        remove_extra: bool,
    ) {
        if remove_extra {
            self.inventory.clear();
        }
        for (id, record) in defaults {
            self.inventory.entry(id.clone()).or_insert(*record);
        }
    }

    /// Overwrites inventory and slots with a fresh snapshot.
    pub fn apply_inventory_snapshot(&mut self, snapshot: InventorySnapshot) {
        self.inventory = snapshot.inventory;
        self.slots = snapshot.slots;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::ItemType;

    fn sword() -> ItemId {
        ItemId::new(ItemType::Weapon, "Sword")
    }

    #[test]
    fn migration_folds_legacy_items_once() {
        let mut record = SaveRecord {
            version: SaveVersion::Initial,
            legacy_items: vec![sword(), ItemId::new(ItemType::Potion, "Health")],
            ..SaveRecord::default()
        };
        record.inventory.insert(sword(), InventoryRecord::new(1, 3));

        assert!(record.migrate());
        assert_eq!(record.version, SaveVersion::LATEST);
        assert!(record.legacy_items.is_empty());
        assert_eq!(record.inventory.get(&sword()), Some(&InventoryRecord::new(1, 3)));
        assert_eq!(
            record.inventory.get(&ItemId::new(ItemType::Potion, "Health")),
            Some(&InventoryRecord::new(1, 1))
        );

        let once = record.clone();
        assert!(!record.migrate());
        assert_eq!(record, once);
    }

    #[test]
    fn defaults_are_additive_unless_extras_removed() {
        let defaults = BTreeMap::from([(sword(), InventoryRecord::new(1, 1))]);
        let potion = ItemId::new(ItemType::Potion, "Health");

        let mut record = SaveRecord::new();
        record.inventory.insert(sword(), InventoryRecord::new(1, 4));
        record.inventory.insert(potion.clone(), InventoryRecord::new(5, 1));
        record.add_default_inventory(&defaults, false);
        assert_eq!(record.inventory.get(&sword()), Some(&InventoryRecord::new(1, 4)));
        assert!(record.inventory.contains_key(&potion));

        record.add_default_inventory(&defaults, true);
        assert_eq!(record.inventory.len(), 1);
        assert_eq!(record.inventory.get(&sword()), Some(&InventoryRecord::new(1, 1)));
    }
}
