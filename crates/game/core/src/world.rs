//! The set of live characters and the clock that drives their effects.
//!
//! Cross-character work (building an effect container spec on one character
//! and applying it to others) goes through [`World`], so that each character
//! still only writes its own state.

use std::collections::BTreeMap;

use tracing::debug;

use crate::ability::{ActivationToken, EffectContainerSpec};
use crate::character::Character;
use crate::effect::{ActiveEffectHandle, TickOutcome};
use crate::entity::EntityId;
use crate::tag::GameplayTag;
use crate::targeting::{GameplayEventData, TargetData, TargetingContext, TargetingRule};

#[derive(Debug, Default)]
pub struct World {
    characters: BTreeMap<EntityId, Character>,
    now: f32,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a character, replacing any previous one with the same id.
    pub fn spawn(&mut self, character: Character) -> EntityId {
        let id = character.id();
        self.characters.insert(id, character);
        id
    }

    pub fn despawn(&mut self, id: EntityId) -> Option<Character> {
        self.characters.remove(&id)
    }

    pub fn character(&self, id: EntityId) -> Option<&Character> {
        self.characters.get(&id)
    }

    pub fn character_mut(&mut self, id: EntityId) -> Option<&mut Character> {
        self.characters.get_mut(&id)
    }

    pub fn characters(&self) -> impl Iterator<Item = &Character> {
        self.characters.values()
    }

    /// Seconds since the world started.
    pub fn now(&self) -> f32 {
        self.now
    }

    /// Advances the clock and ticks every character's effects.
    pub fn advance(&mut self, seconds: f32) -> Vec<(EntityId, TickOutcome)> {
        self.now += seconds.max(0.0);
        let now = self.now;
        self.characters
            .iter_mut()
            .map(|(id, character)| (*id, character.tick(now)))
            .filter(|(_, outcome)| *outcome != TickOutcome::default())
            .collect()
    }

    /// Builds the targets and effect specs of the container keyed by
    /// `event_tag` on the ability behind `token`.
    ///
    /// Returns an empty spec when the owner, the ability or the container is
    /// missing. Effects are bound at `override_level` when given, otherwise at
    /// the ability level.
    pub fn make_effect_container_spec(
        &self,
        owner: EntityId,
        token: ActivationToken,
        event_tag: &GameplayTag,
        event: &GameplayEventData,
        override_level: Option<u32>,
    ) -> EffectContainerSpec {
        let mut container_spec = EffectContainerSpec::default();

        let Some(character) = self.characters.get(&owner) else {
            debug!(%owner, "no character for effect container");
            return container_spec;
        };
        let Some(ability) = character.abilities().spec(token.spec) else {
            debug!(%owner, spec = %token.spec, "no ability for effect container");
            return container_spec;
        };
        let Some(container) = ability.definition.effect_container(event_tag) else {
            debug!(%owner, ability = %ability.definition.id, event = %event_tag, "no effect container for event");
            return container_spec;
        };

        if let Some(target_type) = &container.target_type {
            let context = TargetingContext {
                owner,
                avatar: character.actor_info().avatar,
            };
            let output = target_type.targets(&context, event);
            container_spec.add_targets(output.hits, output.actors);
        }

        let level = override_level.unwrap_or(ability.level);
        let context = character
            .make_effect_context()
            .with_source_object(ability.source.clone());
        container_spec.effect_specs = container
            .effects
            .iter()
            .filter_map(|effect| character.make_outgoing_spec(Some(effect), level, context.clone()))
            .collect();

        container_spec
    }

    /// Applies every effect spec to every target of `container_spec`.
    ///
    /// Single-hit targets carry their hit result into the applied context.
    /// Targets that are not in the world are skipped.
    pub fn apply_effect_container_spec(&mut self, container_spec: &EffectContainerSpec) -> Vec<ActiveEffectHandle> {
        let now = self.now;
        let mut handles = Vec::new();

        for spec in &container_spec.effect_specs {
            for data in container_spec.target_data.iter() {
                let applied = match data {
                    TargetData::SingleHit(hit) => spec.clone().with_hit_result(hit.clone()),
                    TargetData::ActorList(_) => spec.clone(),
                };
                for target in data.actors() {
                    match self.characters.get_mut(&target) {
                        Some(character) => handles.push(character.apply_effect_spec(&applied, now).handle),
                        None => debug!(%target, "skipping missing effect target"),
                    }
                }
            }
        }
        handles
    }

    /// Builds and immediately applies an effect container.
    pub fn apply_effect_container(
        &mut self,
        owner: EntityId,
        token: ActivationToken,
        event_tag: &GameplayTag,
        event: &GameplayEventData,
        override_level: Option<u32>,
    ) -> Vec<ActiveEffectHandle> {
        let container_spec = self.make_effect_container_spec(owner, token, event_tag, event, override_level);
        self.apply_effect_container_spec(&container_spec)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::ability::{AbilityDefinition, EffectContainer};
    use crate::attribute::{AttributeKind, AttributeSet, ModifierOp};
    use crate::effect::{EffectDefinition, EffectExecution, ScalableFloat};
    use crate::entity::SourceObject;
    use crate::targeting::{HitResult, TargetType};

    const HERO: EntityId = EntityId(1);
    const GOBLIN: EntityId = EntityId(2);

    fn melee_event() -> GameplayTag {
        GameplayTag::new("Event.Montage.Hit")
    }

    fn slash() -> Arc<AbilityDefinition> {
        let hit = EffectDefinition::instant("GE_Slash").execution(EffectExecution::Damage {
            base_damage: ScalableFloat::with_curve(10.0, vec![1.0, 2.0]),
        });
        Arc::new(AbilityDefinition::new("GA_Slash").with_container(
            melee_event(),
            EffectContainer::new(Some(TargetType::UseEventData)).with_effect(Arc::new(hit)),
        ))
    }

    fn stats(attack: f32) -> AttributeSet {
        AttributeSet::new()
            .with_base(AttributeKind::MaxHealth, 100.0)
            .with_base(AttributeKind::Health, 100.0)
            .with_base(AttributeKind::AttackPower, attack)
    }

    fn world() -> (World, ActivationToken) {
        let mut world = World::new();
        let mut hero = Character::new(HERO, 1).with_attributes(stats(2.0));
        hero.possess(None, 0.0);
        let handle = hero
            .give_ability(slash(), 2, SourceObject::Character(HERO))
            .expect("grant");
        let token = hero.try_activate_ability(handle).expect("activate");
        world.spawn(hero);
        world.spawn(Character::new(GOBLIN, 1).with_attributes(stats(1.0)));
        (world, token)
    }

    #[test]
    fn container_spec_targets_event_hit_at_ability_level() {
        let (world, token) = world();
        let event = GameplayEventData::with_hit(HitResult::on_actor(GOBLIN));

        let spec = world.make_effect_container_spec(HERO, token, &melee_event(), &event, None);
        assert!(spec.has_valid_effects());
        assert_eq!(spec.target_actors(), vec![GOBLIN]);
        assert_eq!(spec.effect_specs[0].level(), 2);
        assert_eq!(
            spec.effect_specs[0].context().source_object,
            Some(SourceObject::Character(HERO))
        );

        let overridden = world.make_effect_container_spec(HERO, token, &melee_event(), &event, Some(1));
        assert_eq!(overridden.effect_specs[0].level(), 1);
    }

    #[test]
    fn missing_pieces_produce_empty_spec() {
        let (world, token) = world();
        let event = GameplayEventData::default();

        let unknown_tag = world.make_effect_container_spec(HERO, token, &GameplayTag::new("Event.Other"), &event, None);
        assert!(!unknown_tag.has_valid_effects());
        assert!(!unknown_tag.has_valid_targets());

        let unknown_owner = world.make_effect_container_spec(EntityId(9), token, &melee_event(), &event, None);
        assert_eq!(unknown_owner, EffectContainerSpec::default());
    }

    #[test]
    fn applying_container_damages_target_with_hit_context() {
        let (mut world, token) = world();
        let hit = HitResult::on_actor(GOBLIN).at([3.0, 4.0, 0.0]);
        let event = GameplayEventData::with_hit(hit.clone());

        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        world
            .character_mut(GOBLIN)
            .expect("goblin")
            .subscribe(move |event| sink.lock().unwrap().push(event.clone()));

        let handles = world.apply_effect_container(HERO, token, &melee_event(), &event, None);
        assert_eq!(handles.len(), 1);

        // level 2 curve: 10 * 2 = 20, times attack 2, over defense 1
        assert_eq!(world.character(GOBLIN).map(Character::health), Some(60.0));
        assert_eq!(world.character(HERO).map(Character::health), Some(100.0));

        let seen = seen.lock().unwrap();
        match seen.first() {
            Some(crate::attribute::AttributeEvent::Damaged(damage)) => {
                assert_eq!(damage.amount, 40.0);
                assert_eq!(damage.hit.as_ref(), Some(&hit));
                assert_eq!(damage.instigator, Some(HERO));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn advancing_time_expires_buffs() {
        let (mut world, _) = world();
        let buff = Arc::new(EffectDefinition::with_duration("GE_Haste", 2.0).modifier(
            AttributeKind::MoveSpeed,
            ModifierOp::Multiplicative,
            2.0,
        ));
        let goblin = world.character_mut(GOBLIN).expect("goblin");
        let spec = goblin
            .make_outgoing_spec(Some(&buff), 1, goblin.make_effect_context())
            .expect("spec");
        goblin.apply_effect_spec(&spec, 0.0);
        assert_eq!(world.character(GOBLIN).map(Character::move_speed), Some(2.0));

        let ticked = world.advance(1.0);
        assert!(ticked.is_empty());
        let ticked = world.advance(1.0);
        assert_eq!(ticked.len(), 1);
        assert_eq!(world.character(GOBLIN).map(Character::move_speed), Some(1.0));
    }
}
