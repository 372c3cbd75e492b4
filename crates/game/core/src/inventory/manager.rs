//! Per-player inventory and equipment slots.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::warn;

use super::item::{ItemDefinition, ItemId, ItemType};
use super::registry::ItemRegistry;
use super::slot::{InventoryRecord, InventorySnapshot, ItemSlot};
use crate::config::GameConfig;
use crate::events::{EventListeners, ListenerId};
use crate::save::SaveRecord;

/// Change notifications raised by [`Inventory`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InventoryEvent {
    ItemChanged { added: bool, item: ItemId },
    SlotChanged { slot: ItemSlot, item: Option<ItemId> },
    Loaded,
}

/// Destination for inventory snapshots after every successful mutation.
///
/// Returns whether the write was accepted. A missing or failing sink never
/// fails the inventory operation itself.
pub trait SaveSink: Send {
    fn persist(&mut self, snapshot: InventorySnapshot) -> bool;
}

impl<F> SaveSink for F
where
    F: FnMut(InventorySnapshot) -> bool + Send,
{
    fn persist(&mut self, snapshot: InventorySnapshot) -> bool {
        self(snapshot)
    }
}

/// Read access to slot contents, used to reconcile slot-granted abilities.
pub trait InventorySource {
    /// Returns every filled slot with its item.
    fn slotted_item_map(&self) -> BTreeMap<ItemSlot, Arc<ItemDefinition>>;
}

#[derive(Clone, Debug)]
struct InventoryEntry {
    item: Arc<ItemDefinition>,
    record: InventoryRecord,
}

pub struct Inventory {
    slot_layout: BTreeMap<ItemType, u32>,
    items: BTreeMap<ItemId, InventoryEntry>,
    slots: BTreeMap<ItemSlot, Option<Arc<ItemDefinition>>>,
    listeners: EventListeners<InventoryEvent>,
    sink: Option<Box<dyn SaveSink>>,
}

impl Inventory {
    /// Creates an empty inventory with one empty slot per configured position.
    pub fn new(config: &GameConfig) -> Self {
        let mut inventory = Self {
            slot_layout: config.slots_per_type(),
            items: BTreeMap::new(),
            slots: BTreeMap::new(),
            listeners: EventListeners::new(),
            sink: None,
        };
        inventory.reset_slots();
        inventory
    }

    pub fn set_save_sink(&mut self, sink: impl SaveSink + 'static) {
        self.sink = Some(Box::new(sink));
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&InventoryEvent) + Send + 'static) -> ListenerId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    // ===== mutation =====

    /// Adds `count` units of `item` at `level`, optionally auto-slotting it.
    ///
    /// Returns whether the stored record or a slot changed, saving only then.
    /// A missing item or a non-positive count or level is rejected without
    /// side effects.
    pub fn add_item(
        &mut self,
        item: Option<&Arc<ItemDefinition>>,
        count: i32,
        level: i32,
        auto_slot: bool,
    ) -> bool {
        let Some(item) = item else {
            warn!(target: "arpg::inventory", "add_item called with no item");
            return false;
        };
        if count <= 0 || level <= 0 {
            warn!(
                target: "arpg::inventory",
                item = %item.id,
                count,
                level,
                "add_item called with non-positive count or level"
            );
            return false;
        }

        let previous = self.record(&item.id).unwrap_or_default();
        let merged = previous.merged(count, level, item.max_count, item.max_level);

        let mut changed = false;
        if merged != previous {
            self.items.insert(
                item.id.clone(),
                InventoryEntry {
                    item: Arc::clone(item),
                    record: merged,
                },
            );
            self.listeners.emit(&InventoryEvent::ItemChanged {
                added: true,
                item: item.id.clone(),
            });
            changed = true;
        }

        if auto_slot {
            changed |= self.fill_empty_slot_with_item(item);
        }

        if changed {
            self.save_inventory();
        }
        changed
    }

    /// Removes `count` units, or every unit when `count <= 0`.
    ///
    /// When the count reaches zero the item is dropped and every slot holding
    /// it is cleared.
    pub fn remove_item(&mut self, item: Option<&Arc<ItemDefinition>>, count: i32) -> bool {
        let Some(item) = item else {
            warn!(target: "arpg::inventory", "remove_item called with no item");
            return false;
        };
        let Some(entry) = self.items.get_mut(&item.id) else {
            return false;
        };

        let remaining = if count <= 0 {
            0
        } else {
            entry.record.count.saturating_sub(count)
        };

        if remaining > 0 {
            entry.record.count = remaining;
        } else {
            self.items.remove(&item.id);
            let held: Vec<ItemSlot> = self
                .slots
                .iter()
                .filter(|(_, slotted)| slotted.as_ref().is_some_and(|s| s.id == item.id))
                .map(|(slot, _)| *slot)
                .collect();
            for slot in held {
                self.slots.insert(slot, None);
                self.listeners
                    .emit(&InventoryEvent::SlotChanged { slot, item: None });
            }
        }

        self.listeners.emit(&InventoryEvent::ItemChanged {
            added: false,
            item: item.id.clone(),
        });
        self.save_inventory();
        true
    }

    /// Puts `item` (or nothing) into `slot`, clearing any other slot that held
    /// the same item.
    ///
    /// Other slots are cleared even when `slot` is not one of this
    /// inventory's slots; the save only happens when it is.
    pub fn set_slotted_item(&mut self, slot: ItemSlot, item: Option<&Arc<ItemDefinition>>) -> bool {
        if let Some(item) = item {
            let duplicates: Vec<ItemSlot> = self
                .slots
                .iter()
                .filter(|(other, slotted)| {
                    **other != slot && slotted.as_ref().is_some_and(|s| s.id == item.id)
                })
                .map(|(other, _)| *other)
                .collect();
            for other in duplicates {
                self.slots.insert(other, None);
                self.listeners.emit(&InventoryEvent::SlotChanged {
                    slot: other,
                    item: None,
                });
            }
        }

        let Some(target) = self.slots.get_mut(&slot) else {
            warn!(target: "arpg::inventory", %slot, "set_slotted_item on unknown slot");
            return false;
        };
        *target = item.cloned();
        self.listeners.emit(&InventoryEvent::SlotChanged {
            slot,
            item: item.map(|item| item.id.clone()),
        });
        self.save_inventory();
        true
    }

    /// Places every held item into the first empty slot of its type.
    pub fn fill_empty_slots(&mut self) {
        let held: Vec<Arc<ItemDefinition>> =
            self.items.values().map(|entry| Arc::clone(&entry.item)).collect();
        let mut changed = false;
        for item in &held {
            changed |= self.fill_empty_slot_with_item(item);
        }
        if changed {
            self.save_inventory();
        }
    }

    /// Slots `item` into the lowest-numbered empty slot of its type unless it
    /// already occupies one. Does not save.
    pub fn fill_empty_slot_with_item(&mut self, item: &Arc<ItemDefinition>) -> bool {
        let item_type = item.item_type();
        let mut empty = None;
        for (slot, slotted) in self.slots_of_type(item_type) {
            match slotted {
                Some(slotted) if slotted.id == item.id => return false,
                None if empty.is_none() => empty = Some(*slot),
                _ => {}
            }
        }

        let Some(slot) = empty else {
            return false;
        };
        self.slots.insert(slot, Some(Arc::clone(item)));
        self.listeners.emit(&InventoryEvent::SlotChanged {
            slot,
            item: Some(item.id.clone()),
        });
        true
    }

    /// Hands the current state to the save sink.
    pub fn save_inventory(&mut self) -> bool {
        let snapshot = self.snapshot();
        match self.sink.as_mut() {
            Some(sink) => sink.persist(snapshot),
            None => false,
        }
    }

    /// Replaces the inventory with the contents of `record`.
    ///
    /// Slots are recreated from the configured layout. Items the registry
    /// cannot resolve are dropped. When no slot could be restored, held
    /// items are auto-slotted. Returns `false` when there is no record.
    pub fn load_inventory(&mut self, record: Option<&SaveRecord>, registry: &dyn ItemRegistry) -> bool {
        self.items.clear();
        self.reset_slots();

        let Some(record) = record else {
            self.listeners.emit(&InventoryEvent::Loaded);
            return false;
        };

        for (id, stored) in &record.inventory {
            match registry.definition(id) {
                Some(item) => {
                    self.items.insert(
                        id.clone(),
                        InventoryEntry {
                            item,
                            record: *stored,
                        },
                    );
                }
                None => warn!(target: "arpg::inventory", item = %id, "dropping unresolved item"),
            }
        }

        let mut found_any = false;
        for (slot, stored) in &record.slots {
            let Some(id) = stored else { continue };
            if !self.slots.contains_key(slot) {
                continue;
            }
            if let Some(item) = registry.definition(id) {
                self.slots.insert(*slot, Some(item));
                found_any = true;
            }
        }

        if !found_any {
            self.fill_empty_slots();
        }

        self.listeners.emit(&InventoryEvent::Loaded);
        true
    }

    // ===== queries =====

    /// Held items, optionally restricted to one type.
    pub fn items(&self, item_type: Option<ItemType>) -> Vec<Arc<ItemDefinition>> {
        self.items
            .values()
            .filter(|entry| item_type.is_none_or(|t| entry.item.item_type() == t))
            .map(|entry| Arc::clone(&entry.item))
            .collect()
    }

    /// Slotted items, optionally restricted to one type. With `output_empty`
    /// an empty slot contributes `None`.
    pub fn slotted_items(
        &self,
        item_type: Option<ItemType>,
        output_empty: bool,
    ) -> Vec<Option<Arc<ItemDefinition>>> {
        self.slots
            .iter()
            .filter(|(slot, _)| item_type.is_none_or(|t| slot.item_type == t))
            .filter(|(_, item)| output_empty || item.is_some())
            .map(|(_, item)| item.clone())
            .collect()
    }

    pub fn item_count(&self, id: &ItemId) -> i32 {
        self.record(id).map_or(0, |record| record.count)
    }

    pub fn item_data(&self, id: &ItemId) -> Option<InventoryRecord> {
        self.record(id)
    }

    pub fn slotted_item(&self, slot: &ItemSlot) -> Option<Arc<ItemDefinition>> {
        self.slots.get(slot).cloned().flatten()
    }

    pub fn is_valid_item_slot(&self, slot: &ItemSlot) -> bool {
        self.slots.contains_key(slot)
    }

    pub fn slots(&self) -> impl Iterator<Item = (&ItemSlot, Option<&Arc<ItemDefinition>>)> {
        self.slots.iter().map(|(slot, item)| (slot, item.as_ref()))
    }

    pub fn snapshot(&self) -> InventorySnapshot {
        InventorySnapshot {
            inventory: self
                .items
                .iter()
                .map(|(id, entry)| (id.clone(), entry.record))
                .collect(),
            slots: self
                .slots
                .iter()
                .map(|(slot, item)| (*slot, item.as_ref().map(|item| item.id.clone())))
                .collect(),
        }
    }

    // ===== helpers =====

    fn record(&self, id: &ItemId) -> Option<InventoryRecord> {
        self.items.get(id).map(|entry| entry.record)
    }

    fn slots_of_type(
        &self,
        item_type: ItemType,
    ) -> impl Iterator<Item = (&ItemSlot, &Option<Arc<ItemDefinition>>)> {
        self.slots
            .iter()
            .filter(move |(slot, _)| slot.item_type == item_type)
    }

    fn reset_slots(&mut self) {
        self.slots = self
            .slot_layout
            .iter()
            .flat_map(|(&item_type, &count)| {
                (0..count as i32).map(move |number| (ItemSlot::new(item_type, number), None))
            })
            .collect();
    }
}

impl InventorySource for Inventory {
    fn slotted_item_map(&self) -> BTreeMap<ItemSlot, Arc<ItemDefinition>> {
        self.slots
            .iter()
            .filter_map(|(slot, item)| item.as_ref().map(|item| (*slot, Arc::clone(item))))
            .collect()
    }
}

impl std::fmt::Debug for Inventory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Inventory")
            .field("items", &self.items.len())
            .field("slots", &self.slots.len())
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}
