//! Game configuration loader.

use std::path::Path;

use arpg_core::GameConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for game configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    pub fn load(path: &Path) -> LoadResult<GameConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<GameConfig> {
        let config: GameConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arpg_core::{ItemId, ItemSlot, ItemType};

    #[test]
    fn parses_slots_and_default_inventory() {
        let config = ConfigLoader::parse(
            r#"
            [[item_slots]]
            item_type = "Weapon"
            count = 2

            [[default_inventory]]
            item = { item_type = "Potion", name = "Health" }
            count = 3
            level = 1
            "#,
        )
        .expect("config");

        assert!(config.is_valid_item_slot(&ItemSlot::new(ItemType::Weapon, 1)));
        assert!(!config.is_valid_item_slot(&ItemSlot::new(ItemType::Skill, 0)));
        assert_eq!(
            config.default_inventory_map()[&ItemId::new(ItemType::Potion, "Health")].count,
            3
        );
    }

    #[test]
    fn rejects_unknown_item_types() {
        let result = ConfigLoader::parse(
            r#"
            [[item_slots]]
            item_type = "Helmet"
            count = 1
            "#,
        );
        assert!(result.is_err());
    }
}
