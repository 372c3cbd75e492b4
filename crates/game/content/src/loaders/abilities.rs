//! Ability template loader.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};
use crate::templates::AbilityTemplate;

/// Ability list structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilityList {
    pub abilities: Vec<AbilityTemplate>,
}

/// Loader for ability templates from RON files.
///
/// Effects are referenced by id; resolve them with
/// [`ContentLibrary::add_abilities`](crate::ContentLibrary::add_abilities).
pub struct AbilityLoader;

impl AbilityLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<AbilityTemplate>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<Vec<AbilityTemplate>> {
        let list: AbilityList = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse abilities RON: {}", e))?;

        Ok(list.abilities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::TargetTypeSpec;
    use arpg_core::{GameplayTag, InstancingPolicy};

    #[test]
    fn parses_containers_keyed_by_event() {
        let abilities = AbilityLoader::parse(
            r#"(
                abilities: [
                    (
                        id: "GA_Fireball",
                        ability_tags: ["Ability.Skill.Fireball"],
                        cost: Some("GE_FireballCost"),
                        instancing: InstancedPerExecution,
                        effect_containers: {
                            "Event.Montage.Hit": (target_type: Some(UseEventData), effects: ["GE_FireballDamage"]),
                        },
                    ),
                ],
            )"#,
        )
        .expect("abilities");

        let fireball = &abilities[0];
        assert_eq!(fireball.id.0, "GA_Fireball");
        assert_eq!(fireball.instancing, InstancingPolicy::InstancedPerExecution);
        assert_eq!(fireball.cooldown, None);
        let container = &fireball.effect_containers[&GameplayTag::new("Event.Montage.Hit")];
        assert_eq!(container.target_type, Some(TargetTypeSpec::UseEventData));
        assert_eq!(container.effects.len(), 1);
    }
}
