//! Item template loader.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};
use crate::templates::ItemTemplate;

/// Item list structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemList {
    pub items: Vec<ItemTemplate>,
}

/// Loader for item templates from RON files.
pub struct ItemLoader;

impl ItemLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<ItemTemplate>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<Vec<ItemTemplate>> {
        let list: ItemList = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse item catalog RON: {}", e))?;

        Ok(list.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arpg_core::ItemType;

    #[test]
    fn omitted_limits_default_to_one() {
        let items = ItemLoader::parse(
            r#"(
                items: [
                    (item_type: Weapon, name: "Axe", ability: Some("GA_Melee"), ability_level: 2),
                    (item_type: Potion, name: "Health", max_count: 0, price: 20),
                ],
            )"#,
        )
        .expect("items");

        assert_eq!(items[0].item_type, ItemType::Weapon);
        assert_eq!(items[0].max_count, 1);
        assert_eq!(items[0].ability_level, 2);
        assert_eq!(items[1].max_count, 0);
        assert_eq!(items[1].max_level, 1);
        assert_eq!(items[1].id().to_string(), "Potion:Health");
    }
}
