//! Effect definition loader.

use std::path::Path;

use arpg_core::EffectDefinition;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Effect list structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectList {
    pub effects: Vec<EffectDefinition>,
}

/// Loader for effect definitions from RON files.
pub struct EffectLoader;

impl EffectLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<EffectDefinition>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<Vec<EffectDefinition>> {
        let list: EffectList = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse effects RON: {}", e))?;

        Ok(list.effects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arpg_core::{AttributeKind, DurationPolicy, GameplayTag, ModifierOp, ScalableFloat};

    #[test]
    fn parses_duration_effect_with_tags() {
        let effects = EffectLoader::parse(
            r#"(
                effects: [
                    (
                        id: "GE_Cooldown",
                        duration: HasDuration((value: 3.0)),
                        granted_tags: ["Cooldown.Skill.Fireball"],
                    ),
                    (
                        id: "GE_Heal",
                        modifiers: [
                            (attribute: Health, op: Additive, magnitude: Scalable((value: 40.0, curve: [1.0, 2.0]))),
                        ],
                    ),
                ],
            )"#,
        )
        .expect("effects");

        assert_eq!(effects.len(), 2);
        assert_eq!(
            effects[0].duration,
            DurationPolicy::HasDuration(ScalableFloat::constant(3.0))
        );
        assert!(
            effects[0]
                .granted_tags
                .has_tag(&GameplayTag::new("Cooldown.Skill"))
        );
        assert!(effects[1].is_instant());
        assert_eq!(effects[1].modifiers[0].attribute, AttributeKind::Health);
        assert_eq!(effects[1].modifiers[0].op, ModifierOp::Additive);
    }
}
