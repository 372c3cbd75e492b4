//! Resolved content: shared definitions cross-linked by id.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, anyhow, bail};

use arpg_core::{
    AbilityDefinition, AbilityId, AttributeSet, Character, EffectContainer, EffectDefinition,
    EffectId, EntityId, GameConfig, ItemCatalog, ItemDefinition, ItemRegistry,
};

use crate::loaders::{
    AbilityLoader, CharacterLoader, ConfigLoader, EffectLoader, ItemLoader, LoadResult,
};
use crate::templates::{AbilityTemplate, CharacterTemplate, ItemTemplate};

/// Every loaded definition, indexed by id.
///
/// Content must be added in dependency order: effects, then abilities, then
/// items and characters. Each `add_*` call fails on duplicate ids and on
/// references to content that has not been added yet.
#[derive(Clone, Debug)]
pub struct ContentLibrary {
    config: GameConfig,
    effects: BTreeMap<EffectId, Arc<EffectDefinition>>,
    abilities: BTreeMap<AbilityId, Arc<AbilityDefinition>>,
    items: ItemCatalog,
    characters: BTreeMap<String, CharacterTemplate>,
}

impl ContentLibrary {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            effects: BTreeMap::new(),
            abilities: BTreeMap::new(),
            items: ItemCatalog::new(),
            characters: BTreeMap::new(),
        }
    }

    /// Content compiled into the crate from its `data/` directory.
    pub fn bundled() -> LoadResult<Self> {
        let mut library = Self::new(ConfigLoader::parse(include_str!("../data/config.toml"))?);
        library.add_effects(EffectLoader::parse(include_str!("../data/effects.ron"))?)?;
        library.add_abilities(AbilityLoader::parse(include_str!("../data/abilities.ron"))?)?;
        library.add_items(ItemLoader::parse(include_str!("../data/items.ron"))?)?;
        library.add_characters(CharacterLoader::parse(include_str!("../data/characters.ron"))?)?;
        library.validate()?;
        Ok(library)
    }

    pub fn add_effects(&mut self, effects: Vec<EffectDefinition>) -> LoadResult<()> {
        for effect in effects {
            if self.effects.contains_key(&effect.id) {
                bail!("duplicate effect {}", effect.id);
            }
            self.effects.insert(effect.id.clone(), Arc::new(effect));
        }
        Ok(())
    }

    pub fn add_abilities(&mut self, templates: Vec<AbilityTemplate>) -> LoadResult<()> {
        for template in templates {
            if self.abilities.contains_key(&template.id) {
                bail!("duplicate ability {}", template.id);
            }
            let ability = self
                .resolve_ability(&template)
                .with_context(|| format!("in ability {}", template.id))?;
            self.abilities.insert(template.id, Arc::new(ability));
        }
        Ok(())
    }

    pub fn add_items(&mut self, templates: Vec<ItemTemplate>) -> LoadResult<()> {
        for template in templates {
            let id = template.id();
            if self.items.definition(&id).is_some() {
                bail!("duplicate item {id}");
            }
            let granted_ability = template
                .ability
                .as_ref()
                .map(|ability| self.ability_ref(ability))
                .transpose()
                .with_context(|| format!("in item {id}"))?;

            self.items.insert(ItemDefinition {
                display_name: template.display_name.unwrap_or_else(|| template.name.clone()),
                id,
                description: template.description,
                price: template.price,
                max_count: template.max_count,
                max_level: template.max_level,
                granted_ability,
                ability_level: template.ability_level,
                linked_item: template.linked_item,
            });
        }
        Ok(())
    }

    pub fn add_characters(&mut self, templates: Vec<CharacterTemplate>) -> LoadResult<()> {
        for template in templates {
            if self.characters.contains_key(&template.name) {
                bail!("duplicate character {}", template.name);
            }
            self.check_character(&template)
                .with_context(|| format!("in character {}", template.name))?;
            self.characters.insert(template.name.clone(), template);
        }
        Ok(())
    }

    /// Checks references that can only be verified once everything is added:
    /// default inventory items and linked items.
    pub fn validate(&self) -> LoadResult<()> {
        for default in &self.config.default_inventory {
            if self.items.definition(&default.item).is_none() {
                bail!("default inventory references unknown item {}", default.item);
            }
        }
        for item in self.items.all_definitions() {
            if let Some(linked) = &item.linked_item
                && self.items.definition(linked).is_none()
            {
                bail!("item {} links to unknown item {linked}", item.id);
            }
        }
        Ok(())
    }

    // ===== queries =====

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn effect(&self, id: &EffectId) -> Option<Arc<EffectDefinition>> {
        self.effects.get(id).cloned()
    }

    pub fn ability(&self, id: &AbilityId) -> Option<Arc<AbilityDefinition>> {
        self.abilities.get(id).cloned()
    }

    pub fn items(&self) -> &ItemCatalog {
        &self.items
    }

    /// A shareable registry over the loaded items.
    pub fn item_registry(&self) -> Arc<dyn ItemRegistry> {
        Arc::new(self.items.clone())
    }

    pub fn character_template(&self, name: &str) -> Option<&CharacterTemplate> {
        self.characters.get(name)
    }

    pub fn character_names(&self) -> impl Iterator<Item = &str> {
        self.characters.keys().map(String::as_str)
    }

    /// Builds the character named `name` with entity id `id`.
    pub fn spawn_character(&self, name: &str, id: EntityId) -> LoadResult<Character> {
        let template = self
            .characters
            .get(name)
            .ok_or_else(|| anyhow!("unknown character {name}"))?;

        let attributes = template
            .attributes
            .iter()
            .fold(AttributeSet::new(), |set, (kind, value)| set.with_base(*kind, *value));
        let mut character = Character::new(id, template.level).with_attributes(attributes);

        for ability in &template.startup_abilities {
            character = character.with_startup_ability(self.ability_ref(ability)?);
        }
        for effect in &template.passive_effects {
            character = character.with_passive_effect(self.effect_ref(effect)?);
        }
        for (slot, ability) in &template.slot_abilities {
            character = character.with_default_slotted_ability(*slot, self.ability_ref(ability)?);
        }
        Ok(character)
    }

    // ===== resolution =====

    fn effect_ref(&self, id: &EffectId) -> LoadResult<Arc<EffectDefinition>> {
        self.effect(id).ok_or_else(|| anyhow!("unknown effect {id}"))
    }

    fn ability_ref(&self, id: &AbilityId) -> LoadResult<Arc<AbilityDefinition>> {
        self.ability(id).ok_or_else(|| anyhow!("unknown ability {id}"))
    }

    fn resolve_ability(&self, template: &AbilityTemplate) -> LoadResult<AbilityDefinition> {
        let mut ability = AbilityDefinition::new(template.id.0.clone())
            .with_instancing(template.instancing);
        ability.ability_tags = template.ability_tags.clone();
        ability.activation_blocked_tags = template.activation_blocked_tags.clone();
        ability.activation_required_tags = template.activation_required_tags.clone();
        ability.cost = template.cost.as_ref().map(|id| self.effect_ref(id)).transpose()?;
        ability.cooldown = template
            .cooldown
            .as_ref()
            .map(|id| self.effect_ref(id))
            .transpose()?;

        for (event, container) in &template.effect_containers {
            let mut resolved = EffectContainer::new(container.target_type.map(Into::into));
            for effect in &container.effects {
                resolved = resolved.with_effect(self.effect_ref(effect)?);
            }
            ability = ability.with_container(event.clone(), resolved);
        }
        Ok(ability)
    }

    fn check_character(&self, template: &CharacterTemplate) -> LoadResult<()> {
        for ability in template
            .startup_abilities
            .iter()
            .chain(template.slot_abilities.iter().map(|(_, ability)| ability))
        {
            self.ability_ref(ability)?;
        }
        for effect in &template.passive_effects {
            self.effect_ref(effect)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::{ContainerTemplate, TargetTypeSpec};
    use arpg_core::{
        AttributeKind, GameplayTag, ItemId, ItemSlot, ItemType, SourceObject, TagContainer,
    };

    fn hit() -> GameplayTag {
        GameplayTag::new("Event.Montage.Hit")
    }

    fn melee_template(effect: &str) -> AbilityTemplate {
        AbilityTemplate {
            id: AbilityId::from("GA_Melee"),
            ability_tags: TagContainer::single("Ability.Melee"),
            activation_blocked_tags: TagContainer::new(),
            activation_required_tags: TagContainer::new(),
            cost: None,
            cooldown: None,
            instancing: Default::default(),
            effect_containers: BTreeMap::from([(
                hit(),
                ContainerTemplate {
                    target_type: Some(TargetTypeSpec::UseEventData),
                    effects: vec![EffectId::from(effect)],
                },
            )]),
        }
    }

    fn library() -> ContentLibrary {
        let mut library = ContentLibrary::new(GameConfig::new());
        library
            .add_effects(vec![EffectDefinition::instant("GE_Hit")])
            .expect("effects");
        library
            .add_abilities(vec![melee_template("GE_Hit")])
            .expect("abilities");
        library
    }

    #[test]
    fn abilities_share_resolved_effects() {
        let library = library();
        let ability = library.ability(&AbilityId::from("GA_Melee")).expect("ability");
        let container = ability.effect_container(&hit()).expect("container");
        let effect = library.effect(&EffectId::from("GE_Hit")).expect("effect");
        assert!(Arc::ptr_eq(&container.effects[0], &effect));
    }

    #[test]
    fn unknown_references_are_rejected_with_context() {
        let mut library = ContentLibrary::new(GameConfig::new());
        let err = library
            .add_abilities(vec![melee_template("GE_Missing")])
            .expect_err("missing effect");
        let message = format!("{err:#}");
        assert!(message.contains("GA_Melee"));
        assert!(message.contains("GE_Missing"));
    }

    #[test]
    fn duplicates_are_rejected() {
        let mut library = library();
        assert!(
            library
                .add_effects(vec![EffectDefinition::instant("GE_Hit")])
                .is_err()
        );
    }

    #[test]
    fn default_inventory_must_exist() {
        let config = GameConfig::new().with_default_item(ItemId::new(ItemType::Weapon, "Ghost"), 1, 1);
        assert!(ContentLibrary::new(config).validate().is_err());
    }

    #[test]
    fn spawned_character_carries_template_data() {
        let mut library = library();
        library
            .add_characters(vec![CharacterTemplate {
                name: "Hero".into(),
                level: 3,
                attributes: BTreeMap::from([(AttributeKind::MaxHealth, 80.0), (AttributeKind::Health, 80.0)]),
                startup_abilities: vec![],
                passive_effects: vec![],
                slot_abilities: vec![(ItemSlot::new(ItemType::Weapon, 0), AbilityId::from("GA_Melee"))],
            }])
            .expect("characters");

        let mut hero = library.spawn_character("Hero", EntityId(7)).expect("spawn");
        assert_eq!(hero.level(), 3);
        assert_eq!(hero.health(), 80.0);

        hero.possess(None, 0.0);
        let handle = hero.slotted_abilities()[&ItemSlot::new(ItemType::Weapon, 0)];
        let spec = hero.abilities().spec(handle).expect("spec");
        assert_eq!(spec.level, 3);
        assert_eq!(spec.source, SourceObject::Character(EntityId(7)));

        assert!(library.spawn_character("Nobody", EntityId(8)).is_err());
    }

    #[test]
    fn bundled_content_is_consistent() {
        let library = ContentLibrary::bundled().expect("bundled");
        for default in &library.config().default_inventory {
            assert!(library.items().definition(&default.item).is_some());
        }
        for name in library.character_names() {
            library
                .spawn_character(name, EntityId(1))
                .expect("bundled character");
        }
    }
}
