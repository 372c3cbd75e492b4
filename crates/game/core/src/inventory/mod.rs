//! Items, equipment slots and the per-player inventory.

mod item;
mod manager;
mod registry;
mod slot;

pub use item::{ItemDefinition, ItemId, ItemType};
pub use manager::{Inventory, InventoryEvent, InventorySource, SaveSink};
pub use registry::{ItemCatalog, ItemRegistry};
pub use slot::{InventoryRecord, InventorySnapshot, ItemSlot};
