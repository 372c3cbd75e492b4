use std::collections::BTreeMap;
use std::fmt;

use super::item::{ItemId, ItemType};

/// An equipment position: item type plus slot number.
///
/// Slots are ordered by type, then number, so "first empty slot" scans are
/// deterministic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemSlot {
    pub item_type: ItemType,
    pub slot_number: i32,
}

impl ItemSlot {
    pub const fn new(item_type: ItemType, slot_number: i32) -> Self {
        Self {
            item_type,
            slot_number,
        }
    }
}

impl fmt::Display for ItemSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.item_type, self.slot_number)
    }
}

/// Per-item count and level stored in the inventory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InventoryRecord {
    pub count: i32,
    pub level: i32,
}

impl InventoryRecord {
    pub const fn new(count: i32, level: i32) -> Self {
        Self { count, level }
    }

    /// Applies an acquisition of `count` units at `level`.
    ///
    /// Count accumulates and is clamped to `[1, max_count]`; level is replaced
    /// and clamped to `[1, max_level]`. A non-positive maximum means unlimited.
    pub fn merged(self, count: i32, level: i32, max_count: i32, max_level: i32) -> Self {
        let count_cap = if max_count <= 0 { i32::MAX } else { max_count };
        let level_cap = if max_level <= 0 { i32::MAX } else { max_level };
        Self {
            count: self.count.saturating_add(count).clamp(1, count_cap),
            level: level.clamp(1, level_cap),
        }
    }
}

/// Serializable view of an inventory: counts per item and slot contents.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InventorySnapshot {
    pub inventory: BTreeMap<ItemId, InventoryRecord>,
    pub slots: BTreeMap<ItemSlot, Option<ItemId>>,
}
