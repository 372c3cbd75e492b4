use std::collections::BTreeMap;
use std::sync::Arc;

use super::item::{ItemDefinition, ItemId, ItemType};

/// Resolves item identifiers to their descriptions.
///
/// Passed by reference wherever ids need resolving (inventory load, session
/// commands). An unresolved id behaves as an absent item.
pub trait ItemRegistry: Send + Sync {
    fn definition(&self, id: &ItemId) -> Option<Arc<ItemDefinition>>;

    /// Returns every description known to this registry.
    fn all_definitions(&self) -> Vec<Arc<ItemDefinition>>;

    fn definitions_of_type(&self, item_type: ItemType) -> Vec<Arc<ItemDefinition>> {
        self.all_definitions()
            .into_iter()
            .filter(|item| item.item_type() == item_type)
            .collect()
    }
}

/// In-memory registry backed by a sorted map.
#[derive(Clone, Debug, Default)]
pub struct ItemCatalog {
    items: BTreeMap<ItemId, Arc<ItemDefinition>>,
}

impl ItemCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_definitions(definitions: impl IntoIterator<Item = ItemDefinition>) -> Self {
        let mut catalog = Self::new();
        for definition in definitions {
            catalog.insert(definition);
        }
        catalog
    }

    /// Adds or replaces a description, returning the shared handle.
    pub fn insert(&mut self, definition: ItemDefinition) -> Arc<ItemDefinition> {
        let shared = Arc::new(definition);
        self.items.insert(shared.id.clone(), Arc::clone(&shared));
        shared
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl ItemRegistry for ItemCatalog {
    fn definition(&self, id: &ItemId) -> Option<Arc<ItemDefinition>> {
        self.items.get(id).cloned()
    }

    fn all_definitions(&self) -> Vec<Arc<ItemDefinition>> {
        self.items.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_resolves_by_id_and_type() {
        let catalog = ItemCatalog::from_definitions([
            ItemDefinition::new(ItemType::Weapon, "Axe"),
            ItemDefinition::new(ItemType::Potion, "Health"),
            ItemDefinition::new(ItemType::Weapon, "Sword"),
        ]);

        assert_eq!(catalog.len(), 3);
        assert!(catalog.definition(&ItemId::new(ItemType::Weapon, "Axe")).is_some());
        assert!(catalog.definition(&ItemId::new(ItemType::Skill, "Axe")).is_none());

        let weapons: Vec<String> = catalog
            .definitions_of_type(ItemType::Weapon)
            .iter()
            .map(|item| item.id.name.clone())
            .collect();
        assert_eq!(weapons, vec!["Axe", "Sword"]);
    }
}
