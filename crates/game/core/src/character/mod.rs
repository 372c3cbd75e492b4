//! A character: attributes, active effects and granted abilities composed
//! behind one owner.
//!
//! The character is the only writer of its own state. Other characters are
//! referenced only through effect contexts (instigator, causer).

mod slotted;

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, warn};

pub use slotted::{ReconcileMode, ReconcileReport, SlotBinding};

use crate::ability::{
    AbilityDefinition, AbilitySpecHandle, AbilitySystem, ActivationError, ActivationToken,
    ClearOutcome, EndOutcome, unaffordable_cost,
};
use crate::attribute::{AttributeEvent, AttributeKind, AttributeSet};
use crate::effect::{
    ActiveEffectsContainer, EffectApplication, EffectContext, EffectDefinition, EffectQuery,
    EffectSpec, EffectTarget, EffectTiming, TickOutcome, apply_effect_spec, remove_matching,
    tick_effects,
};
use crate::entity::{ActorInfo, EntityId, SourceObject};
use crate::events::{EventListeners, ListenerId};
use crate::inventory::{InventorySource, ItemSlot};
use crate::tag::TagContainer;

/// Notifications a character raises to its host.
pub type CharacterEvent = AttributeEvent;

pub struct Character {
    id: EntityId,
    actor_info: ActorInfo,
    level: u32,
    authority: bool,
    attributes: AttributeSet,
    effects: ActiveEffectsContainer,
    abilities: AbilitySystem,
    startup_abilities: Vec<Arc<AbilityDefinition>>,
    passive_effects: Vec<Arc<EffectDefinition>>,
    default_slotted_abilities: BTreeMap<ItemSlot, Arc<AbilityDefinition>>,
    slotted_abilities: BTreeMap<ItemSlot, AbilitySpecHandle>,
    abilities_initialized: bool,
    listeners: EventListeners<CharacterEvent>,
}

impl Character {
    /// Creates an authoritative character whose owner and avatar are `id`.
    pub fn new(id: EntityId, level: u32) -> Self {
        Self {
            id,
            actor_info: ActorInfo::for_entity(id),
            level: level.max(1),
            authority: true,
            attributes: AttributeSet::new(),
            effects: ActiveEffectsContainer::new(),
            abilities: AbilitySystem::new(),
            startup_abilities: Vec::new(),
            passive_effects: Vec::new(),
            default_slotted_abilities: BTreeMap::new(),
            slotted_abilities: BTreeMap::new(),
            abilities_initialized: false,
            listeners: EventListeners::new(),
        }
    }

    #[must_use]
    pub fn with_actor_info(mut self, actor_info: ActorInfo) -> Self {
        self.actor_info = actor_info;
        self
    }

    #[must_use]
    pub fn with_attributes(mut self, attributes: AttributeSet) -> Self {
        self.attributes = attributes;
        self
    }

    #[must_use]
    pub fn with_authority(mut self, authority: bool) -> Self {
        self.authority = authority;
        self
    }

    #[must_use]
    pub fn with_startup_ability(mut self, ability: Arc<AbilityDefinition>) -> Self {
        self.startup_abilities.push(ability);
        self
    }

    #[must_use]
    pub fn with_passive_effect(mut self, effect: Arc<EffectDefinition>) -> Self {
        self.passive_effects.push(effect);
        self
    }

    /// Binds an ability to a slot when no item in that slot grants one.
    #[must_use]
    pub fn with_default_slotted_ability(mut self, slot: ItemSlot, ability: Arc<AbilityDefinition>) -> Self {
        self.default_slotted_abilities.insert(slot, ability);
        self
    }

    // ===== accessors =====

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn actor_info(&self) -> &ActorInfo {
        &self.actor_info
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn is_authoritative(&self) -> bool {
        self.authority
    }

    pub fn abilities_initialized(&self) -> bool {
        self.abilities_initialized
    }

    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    pub fn active_effects(&self) -> &ActiveEffectsContainer {
        &self.effects
    }

    pub fn abilities(&self) -> &AbilitySystem {
        &self.abilities
    }

    pub fn slotted_abilities(&self) -> &BTreeMap<ItemSlot, AbilitySpecHandle> {
        &self.slotted_abilities
    }

    pub fn health(&self) -> f32 {
        self.attributes.health()
    }

    pub fn max_health(&self) -> f32 {
        self.attributes.max_health()
    }

    pub fn mana(&self) -> f32 {
        self.attributes.mana()
    }

    pub fn max_mana(&self) -> f32 {
        self.attributes.max_mana()
    }

    pub fn move_speed(&self) -> f32 {
        self.attributes.move_speed()
    }

    /// Tags granted by every active effect.
    pub fn owned_tags(&self) -> TagContainer {
        self.effects.owned_tags()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&CharacterEvent) + Send + 'static) -> ListenerId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    // ===== effects =====

    /// Context naming this character as instigator.
    pub fn make_effect_context(&self) -> EffectContext {
        EffectContext::from_instigator(self.actor_info)
    }

    /// Binds `definition` to `level` and `context`, capturing this
    /// character's current attributes and owned tags as the source.
    ///
    /// Returns `None` when there is no definition.
    pub fn make_outgoing_spec(
        &self,
        definition: Option<&Arc<EffectDefinition>>,
        level: u32,
        context: EffectContext,
    ) -> Option<EffectSpec> {
        let definition = definition?;
        Some(EffectSpec::new(
            Arc::clone(definition),
            level,
            context,
            self.attributes.snapshot(),
            self.owned_tags(),
        ))
    }

    /// Applies `spec` to this character and raises the resulting notifications.
    pub fn apply_effect_spec(&mut self, spec: &EffectSpec, now: f32) -> EffectApplication {
        let application = apply_effect_spec(
            spec,
            EffectTarget {
                attributes: &mut self.attributes,
                effects: &mut self.effects,
            },
            now,
        );
        self.dispatch(&application.events);
        application
    }

    /// Removes every active effect whose source object is `source`.
    pub fn remove_effects_from_source(&mut self, source: &SourceObject) -> usize {
        let removed = remove_matching(
            &EffectQuery::from_source(source.clone()),
            EffectTarget {
                attributes: &mut self.attributes,
                effects: &mut self.effects,
            },
        );
        if removed > 0 {
            debug!(character = %self.id, %source, removed, "removed effects from source");
        }
        removed
    }

    /// Runs due periodic executions and drops expired effects.
    pub fn tick(&mut self, now: f32) -> TickOutcome {
        let outcome = tick_effects(
            EffectTarget {
                attributes: &mut self.attributes,
                effects: &mut self.effects,
            },
            now,
        );
        self.dispatch(&outcome.events);
        outcome
    }

    /// Longest remaining cooldown among active effects granting any of
    /// `cooldown_tags`, with its total duration.
    ///
    /// The first effect wins ties. An empty tag set never matches.
    pub fn cooldown_remaining_for_tags(&self, cooldown_tags: &TagContainer, now: f32) -> Option<EffectTiming> {
        if cooldown_tags.is_empty() {
            return None;
        }
        let query = EffectQuery::owning_any(cooldown_tags.clone());
        self.effects
            .timings(&query, now)
            .into_iter()
            .fold(None, |best: Option<EffectTiming>, timing| match best {
                Some(best) if timing.remaining <= best.remaining => Some(best),
                _ => Some(timing),
            })
    }

    /// Forwards hook notifications to listeners.
    ///
    /// Nothing is raised without an avatar. Health, mana and speed changes are
    /// held back until abilities are initialized; damage always goes out.
    fn dispatch(&mut self, events: &[AttributeEvent]) {
        if self.actor_info.avatar.is_none() {
            return;
        }
        for event in events {
            let gated = !matches!(event, AttributeEvent::Damaged(_));
            if gated && !self.abilities_initialized {
                continue;
            }
            self.listeners.emit(event);
        }
    }

    // ===== abilities =====

    pub fn give_ability(
        &mut self,
        ability: Arc<AbilityDefinition>,
        level: u32,
        source: SourceObject,
    ) -> Result<AbilitySpecHandle, ActivationError> {
        if !self.authority {
            return Err(ActivationError::NotAuthoritative);
        }
        Ok(self.abilities.give_ability(ability, level, source))
    }

    pub fn clear_ability(&mut self, handle: AbilitySpecHandle) -> ClearOutcome {
        self.abilities.clear_ability(handle)
    }

    /// Runs the activation checks and starts an instance.
    ///
    /// Check order: grant state, cooldown tags, blocked tags, required tags,
    /// instance limit, then cost.
    pub fn try_activate_ability(&mut self, handle: AbilitySpecHandle) -> Result<ActivationToken, ActivationError> {
        let owned = self.owned_tags();
        let token = self.abilities.begin_activation(handle, &owned)?;

        if let Some(attribute) = self.unaffordable_cost_of(handle) {
            self.abilities.end_activation(token)?;
            debug!(character = %self.id, %handle, %attribute, "activation failed on cost");
            return Err(ActivationError::InsufficientCost(attribute));
        }
        Ok(token)
    }

    /// Pays the cost and starts the cooldown of a running activation.
    pub fn commit_ability(&mut self, token: ActivationToken, now: f32) -> Result<(), ActivationError> {
        if self.abilities.instance_state(token).is_none() {
            return Err(ActivationError::UnknownInstance);
        }
        let spec = self
            .abilities
            .spec(token.spec)
            .ok_or(ActivationError::UnknownInstance)?;
        let definition = Arc::clone(&spec.definition);
        let level = spec.level;
        let context = self.make_effect_context().with_source_object(spec.source.clone());

        if let Some(cost) = self.make_outgoing_spec(definition.cost.as_ref(), level, context.clone()) {
            if let Some(attribute) = unaffordable_cost(&cost, &self.attributes) {
                return Err(ActivationError::InsufficientCost(attribute));
            }
            self.apply_effect_spec(&cost, now);
        }
        if let Some(cooldown) = self.make_outgoing_spec(definition.cooldown.as_ref(), level, context) {
            self.apply_effect_spec(&cooldown, now);
        }

        self.abilities.mark_committed(token)
    }

    pub fn end_ability(&mut self, token: ActivationToken) -> Result<EndOutcome, ActivationError> {
        self.abilities.end_activation(token)
    }

    /// Aborts an activation. Anything already committed stays committed.
    pub fn cancel_ability(&mut self, token: ActivationToken) -> Result<EndOutcome, ActivationError> {
        debug!(character = %self.id, spec = %token.spec, "ability cancelled");
        self.abilities.end_activation(token)
    }

    /// Activates the ability bound to `slot`.
    pub fn activate_ability_with_slot(&mut self, slot: &ItemSlot) -> Result<ActivationToken, ActivationError> {
        let handle = self
            .slotted_abilities
            .get(slot)
            .copied()
            .filter(|handle| self.abilities.is_live(*handle))
            .ok_or(ActivationError::EmptySlot)?;
        self.try_activate_ability(handle)
    }

    /// Tries every granted ability whose tags contain all of `tags`.
    ///
    /// Returns the tokens of the activations that started.
    pub fn activate_abilities_with_tags(&mut self, tags: &TagContainer) -> Vec<ActivationToken> {
        let candidates = self.abilities.matching_all_tags(tags);
        let mut started = Vec::new();
        for handle in candidates {
            match self.try_activate_ability(handle) {
                Ok(token) => started.push(token),
                Err(error) => debug!(character = %self.id, %handle, %error, "activation by tag failed"),
            }
        }
        started
    }

    pub fn active_abilities_with_tags(&self, tags: &TagContainer) -> Vec<ActivationToken> {
        self.abilities.active_abilities_with_tags(tags)
    }

    fn unaffordable_cost_of(&self, handle: AbilitySpecHandle) -> Option<AttributeKind> {
        let spec = self.abilities.spec(handle)?;
        let context = self.make_effect_context().with_source_object(spec.source.clone());
        let cost = self.make_outgoing_spec(spec.definition.cost.as_ref(), spec.level, context)?;
        unaffordable_cost(&cost, &self.attributes)
    }

    // ===== lifecycle =====

    /// Called when a controller takes over this character.
    ///
    /// Marks granted abilities activatable, grants startup abilities and
    /// passive effects, and binds slot abilities.
    pub fn possess(&mut self, inventory: Option<&dyn InventorySource>, now: f32) {
        self.abilities.set_ready();
        self.add_startup_abilities(inventory, now);
    }

    pub fn unpossess(&mut self) {
        self.remove_startup_abilities();
    }

    /// Grants startup abilities at the character level, applies passive
    /// effects sourced from the character and binds slot abilities.
    ///
    /// Does nothing without authority or when already initialized.
    pub fn add_startup_abilities(&mut self, inventory: Option<&dyn InventorySource>, now: f32) {
        if !self.authority || self.abilities_initialized {
            return;
        }
        let source = SourceObject::Character(self.id);

        for ability in self.startup_abilities.clone() {
            self.abilities.give_ability(ability, self.level, source.clone());
        }

        let context = self.make_effect_context().with_source_object(source);
        for passive in self.passive_effects.clone() {
            if let Some(spec) = self.make_outgoing_spec(Some(&passive), self.level, context.clone()) {
                self.apply_effect_spec(&spec, now);
            }
        }

        self.reconcile_slot_abilities(ReconcileMode::Refresh, inventory);
        self.abilities_initialized = true;
        debug!(character = %self.id, level = self.level, "startup abilities added");
    }

    /// Revokes startup abilities, every effect sourced from the character and
    /// every slot ability.
    pub fn remove_startup_abilities(&mut self) {
        if !self.authority || !self.abilities_initialized {
            return;
        }
        let source = SourceObject::Character(self.id);

        let startup: Vec<AbilitySpecHandle> = self
            .abilities
            .specs()
            .filter(|spec| {
                spec.source == source
                    && self
                        .startup_abilities
                        .iter()
                        .any(|ability| ability.id == spec.definition.id)
            })
            .map(|spec| spec.handle)
            .collect();
        for handle in startup {
            self.abilities.clear_ability(handle);
        }

        self.remove_effects_from_source(&source);
        self.reconcile_slot_abilities(ReconcileMode::RemoveAll, None);
        self.abilities_initialized = false;
        debug!(character = %self.id, "startup abilities removed");
    }

    /// Changes the character level, regranting startup abilities at the new
    /// level. Requires authority.
    pub fn set_character_level(&mut self, level: u32, inventory: Option<&dyn InventorySource>, now: f32) -> bool {
        if !self.authority {
            warn!(character = %self.id, "set_character_level without authority");
            return false;
        }
        self.remove_startup_abilities();
        self.level = level.max(1);
        self.add_startup_abilities(inventory, now);
        true
    }

    /// Re-syncs slot abilities with the inventory once abilities are live.
    pub fn refresh_slotted_abilities(&mut self, inventory: &dyn InventorySource) -> ReconcileReport {
        if !self.abilities_initialized {
            return ReconcileReport::default();
        }
        self.reconcile_slot_abilities(ReconcileMode::Refresh, Some(inventory))
    }
}

impl std::fmt::Debug for Character {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Character")
            .field("id", &self.id)
            .field("level", &self.level)
            .field("authority", &self.authority)
            .field("attributes", &self.attributes)
            .field("effects", &self.effects.len())
            .field("abilities", &self.abilities.len())
            .field("abilities_initialized", &self.abilities_initialized)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::ability::AbilityState;
    use crate::attribute::ModifierOp;

    fn hero() -> Character {
        Character::new(EntityId(1), 1).with_attributes(
            AttributeSet::new()
                .with_base(AttributeKind::MaxHealth, 100.0)
                .with_base(AttributeKind::Health, 100.0)
                .with_base(AttributeKind::MaxMana, 50.0)
                .with_base(AttributeKind::Mana, 50.0),
        )
    }

    fn recording(character: &mut Character) -> Arc<Mutex<Vec<CharacterEvent>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        character.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
        log
    }

    fn damage(amount: f32) -> Arc<EffectDefinition> {
        Arc::new(EffectDefinition::instant("GE_Hit").modifier(
            AttributeKind::Damage,
            ModifierOp::Additive,
            amount,
        ))
    }

    fn fireball() -> Arc<AbilityDefinition> {
        let cost = EffectDefinition::instant("GE_FireballCost").modifier(
            AttributeKind::Mana,
            ModifierOp::Additive,
            -20.0,
        );
        let cooldown = EffectDefinition::with_duration("GE_FireballCooldown", 3.0)
            .granting_tag("Cooldown.Skill.Fireball");
        Arc::new(
            AbilityDefinition::new("GA_Fireball")
                .tagged("Ability.Skill")
                .with_cost(Arc::new(cost))
                .with_cooldown(Arc::new(cooldown)),
        )
    }

    #[test]
    fn missing_definition_yields_no_spec() {
        let character = hero();
        assert!(character.make_outgoing_spec(None, 1, EffectContext::default()).is_none());
    }

    #[test]
    fn health_notifications_wait_for_initialization() {
        let mut character = hero();
        let events = recording(&mut character);

        let spec = character
            .make_outgoing_spec(Some(&damage(10.0)), 1, EffectContext::default())
            .expect("spec");
        character.apply_effect_spec(&spec, 0.0);
        assert_eq!(character.health(), 90.0);
        {
            let events = events.lock().unwrap();
            assert_eq!(events.len(), 1);
            assert!(matches!(events[0], AttributeEvent::Damaged(_)));
        }

        character.possess(None, 0.0);
        character.apply_effect_spec(&spec, 0.0);
        assert_eq!(events.lock().unwrap().len(), 3);
    }

    #[test]
    fn no_avatar_means_no_notifications() {
        let mut character = hero().with_actor_info(ActorInfo::for_entity(EntityId(1)).without_avatar());
        let events = recording(&mut character);
        character.possess(None, 0.0);

        let spec = character
            .make_outgoing_spec(Some(&damage(10.0)), 1, EffectContext::default())
            .expect("spec");
        character.apply_effect_spec(&spec, 0.0);

        assert_eq!(character.health(), 90.0);
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn commit_pays_cost_and_starts_cooldown() {
        let mut character = hero();
        character.possess(None, 0.0);
        let handle = character
            .give_ability(fireball(), 1, SourceObject::Character(EntityId(1)))
            .expect("grant");

        let token = character.try_activate_ability(handle).expect("activate");
        assert_eq!(
            character.abilities().spec(handle).map(|s| s.state()),
            Some(AbilityState::Activating)
        );
        character.commit_ability(token, 0.0).expect("commit");
        assert_eq!(character.mana(), 30.0);
        assert_eq!(
            character.abilities().spec(handle).map(|s| s.state()),
            Some(AbilityState::Committed)
        );
        character.end_ability(token).expect("end");

        assert_eq!(
            character.try_activate_ability(handle),
            Err(ActivationError::OnCooldown)
        );
        let timing = character
            .cooldown_remaining_for_tags(&TagContainer::single("Cooldown.Skill"), 1.0)
            .expect("cooldown");
        assert_eq!(timing.remaining, 2.0);
        assert_eq!(timing.duration, 3.0);

        character.tick(3.0);
        assert!(character.try_activate_ability(handle).is_ok());
    }

    #[test]
    fn activation_fails_when_cost_cannot_be_paid() {
        let mut character = hero().with_attributes(
            AttributeSet::new()
                .with_base(AttributeKind::MaxMana, 50.0)
                .with_base(AttributeKind::Mana, 5.0),
        );
        character.possess(None, 0.0);
        let handle = character
            .give_ability(fireball(), 1, SourceObject::Character(EntityId(1)))
            .expect("grant");

        assert_eq!(
            character.try_activate_ability(handle),
            Err(ActivationError::InsufficientCost(AttributeKind::Mana))
        );
        assert!(character.abilities().spec(handle).is_some_and(|s| !s.is_active()));
    }

    #[test]
    fn cooldown_query_picks_longest_remaining() {
        let mut character = hero();
        let short = Arc::new(EffectDefinition::with_duration("GE_Short", 2.0).granting_tag("Cooldown.A"));
        let long = Arc::new(EffectDefinition::with_duration("GE_Long", 5.0).granting_tag("Cooldown.B"));
        for definition in [&short, &long] {
            let spec = character
                .make_outgoing_spec(Some(definition), 1, EffectContext::default())
                .expect("spec");
            character.apply_effect_spec(&spec, 0.0);
        }

        let tags: TagContainer = ["Cooldown.A", "Cooldown.B"].into_iter().collect();
        let timing = character.cooldown_remaining_for_tags(&tags, 1.0).expect("timing");
        assert_eq!(timing.remaining, 4.0);
        assert_eq!(timing.duration, 5.0);
        assert!(character.cooldown_remaining_for_tags(&TagContainer::new(), 1.0).is_none());
        assert!(character
            .cooldown_remaining_for_tags(&TagContainer::single("Cooldown.C"), 1.0)
            .is_none());
    }

    #[test]
    fn level_change_regrants_startup_abilities_and_passives() {
        let passive = Arc::new(EffectDefinition::infinite("GE_Passive").modifier(
            AttributeKind::AttackPower,
            ModifierOp::Additive,
            5.0,
        ));
        let mut character = hero()
            .with_startup_ability(Arc::new(AbilityDefinition::new("GA_Melee")))
            .with_passive_effect(passive);
        character.possess(None, 0.0);
        assert_eq!(character.attributes().current(AttributeKind::AttackPower), 6.0);
        let first = character.abilities().specs().next().map(|s| s.handle).expect("granted");

        assert!(character.set_character_level(3, None, 0.0));
        assert_eq!(character.level(), 3);
        assert_eq!(character.abilities().len(), 1);
        let regranted = character.abilities().specs().next().expect("regranted");
        assert_ne!(regranted.handle, first);
        assert_eq!(regranted.level, 3);
        assert_eq!(character.active_effects().len(), 1);
        assert_eq!(character.attributes().current(AttributeKind::AttackPower), 6.0);
    }

    #[test]
    fn non_authoritative_character_cannot_grant_or_relevel() {
        let mut character = hero()
            .with_authority(false)
            .with_startup_ability(Arc::new(AbilityDefinition::new("GA_Melee")));
        character.possess(None, 0.0);

        assert!(character.abilities().is_empty());
        assert!(!character.set_character_level(2, None, 0.0));
        assert_eq!(
            character.give_ability(fireball(), 1, SourceObject::Character(EntityId(1))),
            Err(ActivationError::NotAuthoritative)
        );
    }

    #[test]
    fn activation_by_tag_tries_every_match() {
        let mut character = hero();
        character.possess(None, 0.0);
        let source = SourceObject::Character(EntityId(1));
        character
            .give_ability(Arc::new(AbilityDefinition::new("GA_A").tagged("Ability.Melee")), 1, source.clone())
            .expect("grant");
        character
            .give_ability(Arc::new(AbilityDefinition::new("GA_B").tagged("Ability.Melee")), 1, source)
            .expect("grant");

        let started = character.activate_abilities_with_tags(&TagContainer::single("Ability.Melee"));
        assert_eq!(started.len(), 2);
        assert_eq!(
            character
                .active_abilities_with_tags(&TagContainer::single("Ability.Melee"))
                .len(),
            2
        );
    }
}
