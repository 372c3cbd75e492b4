//! Character template loader.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};
use crate::templates::CharacterTemplate;

/// Character list structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterList {
    pub characters: Vec<CharacterTemplate>,
}

/// Loader for character templates from RON files.
pub struct CharacterLoader;

impl CharacterLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<CharacterTemplate>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<Vec<CharacterTemplate>> {
        let list: CharacterList = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse characters RON: {}", e))?;

        Ok(list.characters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arpg_core::{AttributeKind, ItemSlot, ItemType};

    #[test]
    fn parses_attributes_and_slot_bindings() {
        let characters = CharacterLoader::parse(
            r#"(
                characters: [
                    (
                        name: "Goblin",
                        level: 2,
                        attributes: { MaxHealth: 60.0, Health: 60.0 },
                        slot_abilities: [((item_type: Weapon, slot_number: 0), "GA_Claw")],
                    ),
                ],
            )"#,
        )
        .expect("characters");

        let goblin = &characters[0];
        assert_eq!(goblin.level, 2);
        assert_eq!(goblin.attributes[&AttributeKind::Health], 60.0);
        assert_eq!(goblin.slot_abilities[0].0, ItemSlot::new(ItemType::Weapon, 0));
        assert!(goblin.startup_abilities.is_empty());
    }
}
