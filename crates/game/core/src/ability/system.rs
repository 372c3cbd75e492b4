//! Grant table: which abilities a character owns and which are running.

use std::sync::Arc;

use tracing::debug;

use super::definition::{AbilityDefinition, AbilityId, InstancingPolicy};
use super::error::ActivationError;
use super::spec::{
    AbilityInstance, AbilitySpec, AbilitySpecHandle, ActivationToken, InstanceId, InstanceState,
};
use crate::attribute::{AttributeKind, AttributeSet, ModifierOp};
use crate::effect::EffectSpec;
use crate::entity::SourceObject;
use crate::tag::TagContainer;

/// Result of asking the table to drop a spec.
#[derive(Debug)]
pub enum ClearOutcome {
    /// The spec is gone; its state reads `Removed`.
    Removed(Box<AbilitySpec>),
    /// The spec is mid-activation and will be removed when its last instance ends.
    Deferred,
    NotFound,
}

/// What ending an instance did to its spec.
#[derive(Debug, PartialEq, Eq)]
pub enum EndOutcome {
    Ended,
    /// The instance was the last one of a spec marked for removal.
    EndedAndRemoved,
}

#[derive(Clone, Debug, Default)]
pub struct AbilitySystem {
    specs: Vec<AbilitySpec>,
    next_handle: u32,
    next_instance: u32,
    ready: bool,
}

impl AbilitySystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the owner as initialized; every granted spec becomes activatable.
    pub fn set_ready(&mut self) {
        self.ready = true;
        for spec in &mut self.specs {
            spec.ready = true;
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn give_ability(
        &mut self,
        definition: Arc<AbilityDefinition>,
        level: u32,
        source: SourceObject,
    ) -> AbilitySpecHandle {
        self.next_handle += 1;
        let handle = AbilitySpecHandle(self.next_handle);
        debug!(%handle, ability = %definition.id, level, %source, "granted ability");
        self.specs
            .push(AbilitySpec::new(handle, definition, level, source, self.ready));
        handle
    }

    pub fn clear_ability(&mut self, handle: AbilitySpecHandle) -> ClearOutcome {
        let Some(index) = self.specs.iter().position(|s| s.handle == handle) else {
            return ClearOutcome::NotFound;
        };

        if self.specs[index].is_active() {
            self.specs[index].pending_remove = true;
            debug!(%handle, "deferred ability removal until activation ends");
            return ClearOutcome::Deferred;
        }

        let mut spec = self.specs.remove(index);
        spec.removed = true;
        debug!(%handle, ability = %spec.definition.id, "cleared ability");
        ClearOutcome::Removed(Box::new(spec))
    }

    pub fn spec(&self, handle: AbilitySpecHandle) -> Option<&AbilitySpec> {
        self.specs.iter().find(|s| s.handle == handle)
    }

    fn spec_mut(&mut self, handle: AbilitySpecHandle) -> Option<&mut AbilitySpec> {
        self.specs.iter_mut().find(|s| s.handle == handle)
    }

    /// A handle resolves while its spec is granted and not marked for removal.
    pub fn is_live(&self, handle: AbilitySpecHandle) -> bool {
        self.spec(handle).is_some_and(|s| !s.pending_remove)
    }

    pub fn specs(&self) -> impl Iterator<Item = &AbilitySpec> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn find(&self, ability: &AbilityId, source: &SourceObject) -> Option<AbilitySpecHandle> {
        self.specs
            .iter()
            .find(|s| !s.pending_remove && &s.definition.id == ability && &s.source == source)
            .map(|s| s.handle)
    }

    /// Specs whose ability tags contain every tag of `tags`.
    pub fn matching_all_tags(&self, tags: &TagContainer) -> Vec<AbilitySpecHandle> {
        self.specs
            .iter()
            .filter(|s| !s.pending_remove && s.definition.ability_tags.has_all(tags))
            .map(|s| s.handle)
            .collect()
    }

    /// Running instances of every spec matching `tags`, in grant order.
    pub fn active_abilities_with_tags(&self, tags: &TagContainer) -> Vec<ActivationToken> {
        self.specs
            .iter()
            .filter(|s| s.definition.ability_tags.has_all(tags))
            .flat_map(|s| {
                s.instances.iter().map(|instance| ActivationToken {
                    spec: s.handle,
                    instance: instance.id,
                })
            })
            .collect()
    }

    /// Checks state, tags and instancing, then starts an instance.
    ///
    /// Cost affordability is checked by the caller, which owns the attributes.
    pub fn begin_activation(
        &mut self,
        handle: AbilitySpecHandle,
        owned_tags: &TagContainer,
    ) -> Result<ActivationToken, ActivationError> {
        self.next_instance += 1;
        let fresh = InstanceId(self.next_instance);

        let spec = self
            .spec_mut(handle)
            .ok_or(ActivationError::NotGranted(handle))?;
        if spec.pending_remove {
            return Err(ActivationError::PendingRemoval(handle));
        }
        if !spec.ready {
            return Err(ActivationError::NotActivatable(handle));
        }

        let definition = &spec.definition;
        if owned_tags.has_any(&definition.cooldown_tags()) {
            return Err(ActivationError::OnCooldown);
        }
        if owned_tags.has_any(&definition.activation_blocked_tags) {
            return Err(ActivationError::Blocked);
        }
        if !owned_tags.has_all(&definition.activation_required_tags) {
            return Err(ActivationError::MissingRequiredTags);
        }

        let limit = spec.instance_limit();
        if spec.instances.len() >= limit {
            return Err(ActivationError::InstanceLimit { limit });
        }

        let id = match definition.instancing {
            InstancingPolicy::InstancedPerActor => *spec.actor_instance.get_or_insert(fresh),
            InstancingPolicy::NonInstanced | InstancingPolicy::InstancedPerExecution => fresh,
        };
        spec.instances.push(AbilityInstance {
            id,
            state: InstanceState::Activating,
        });

        debug!(%handle, ability = %spec.definition.id, "ability activating");
        Ok(ActivationToken {
            spec: handle,
            instance: id,
        })
    }

    pub fn mark_committed(&mut self, token: ActivationToken) -> Result<(), ActivationError> {
        let instance = self
            .spec_mut(token.spec)
            .and_then(|spec| spec.instances.iter_mut().find(|i| i.id == token.instance))
            .ok_or(ActivationError::UnknownInstance)?;
        instance.state = InstanceState::Committed;
        Ok(())
    }

    pub fn instance_state(&self, token: ActivationToken) -> Option<InstanceState> {
        self.spec(token.spec)?
            .instances
            .iter()
            .find(|i| i.id == token.instance)
            .map(|i| i.state)
    }

    /// Ends (or cancels) one instance. A spec waiting for removal is dropped
    /// once its last instance ends.
    pub fn end_activation(&mut self, token: ActivationToken) -> Result<EndOutcome, ActivationError> {
        let spec = self
            .spec_mut(token.spec)
            .ok_or(ActivationError::UnknownInstance)?;
        let index = spec
            .instances
            .iter()
            .position(|i| i.id == token.instance)
            .ok_or(ActivationError::UnknownInstance)?;
        spec.instances.remove(index);

        if spec.pending_remove && spec.instances.is_empty() {
            self.specs.retain(|s| s.handle != token.spec);
            debug!(handle = %token.spec, "removed ability after final instance ended");
            return Ok(EndOutcome::EndedAndRemoved);
        }
        Ok(EndOutcome::Ended)
    }
}

/// Returns the attribute that `cost` would drive below zero, if any.
pub fn unaffordable_cost(cost: &EffectSpec, attributes: &AttributeSet) -> Option<AttributeKind> {
    cost.definition()
        .modifiers
        .iter()
        .find(|info| {
            let magnitude = info.magnitude.evaluate(cost, attributes);
            let current = attributes.current(info.attribute);
            info.op == ModifierOp::Additive && current + magnitude < 0.0
        })
        .map(|info| info.attribute)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::AbilityState;
    use crate::effect::{EffectContext, EffectDefinition};
    use crate::entity::EntityId;

    fn source() -> SourceObject {
        SourceObject::Character(EntityId(1))
    }

    fn ready_system() -> AbilitySystem {
        let mut system = AbilitySystem::new();
        system.set_ready();
        system
    }

    #[test]
    fn grant_before_ready_stays_granted_until_initialized() {
        let mut system = AbilitySystem::new();
        let handle = system.give_ability(Arc::new(AbilityDefinition::new("GA_Melee")), 1, source());
        assert_eq!(system.spec(handle).map(AbilitySpec::state), Some(AbilityState::Granted));
        assert_eq!(
            system.begin_activation(handle, &TagContainer::new()),
            Err(ActivationError::NotActivatable(handle))
        );

        system.set_ready();
        assert!(system.begin_activation(handle, &TagContainer::new()).is_ok());
    }

    #[test]
    fn cooldown_and_tag_gates_block_activation() {
        let cooldown = Arc::new(EffectDefinition::with_duration("GE_CD", 2.0).granting_tag("Cooldown.Melee"));
        let definition = AbilityDefinition::new("GA_Melee")
            .with_cooldown(cooldown)
            .blocked_by("Status.Stunned")
            .requires("Status.Armed");
        let mut system = ready_system();
        let handle = system.give_ability(Arc::new(definition), 1, source());

        let armed = TagContainer::single("Status.Armed");
        let cooling: TagContainer = ["Status.Armed", "Cooldown.Melee"].into_iter().collect();
        let stunned: TagContainer = ["Status.Armed", "Status.Stunned.Hard"].into_iter().collect();

        assert_eq!(system.begin_activation(handle, &cooling), Err(ActivationError::OnCooldown));
        assert_eq!(system.begin_activation(handle, &stunned), Err(ActivationError::Blocked));
        assert_eq!(
            system.begin_activation(handle, &TagContainer::new()),
            Err(ActivationError::MissingRequiredTags)
        );
        assert!(system.begin_activation(handle, &armed).is_ok());
    }

    #[test]
    fn per_actor_instancing_allows_one_running_instance() {
        let mut system = ready_system();
        let handle = system.give_ability(Arc::new(AbilityDefinition::new("GA_Melee")), 1, source());
        let tags = TagContainer::new();

        let first = system.begin_activation(handle, &tags).expect("first activation");
        assert_eq!(
            system.begin_activation(handle, &tags),
            Err(ActivationError::InstanceLimit { limit: 1 })
        );
        system.end_activation(first).expect("end");
        let second = system.begin_activation(handle, &tags).expect("second activation");
        assert_eq!(first.instance, second.instance);
    }

    #[test]
    fn per_execution_instances_are_unioned_across_matching_specs() {
        let mut system = ready_system();
        let fire = Arc::new(
            AbilityDefinition::new("GA_Fire")
                .tagged("Ability.Skill")
                .with_instancing(InstancingPolicy::InstancedPerExecution),
        );
        let ice = Arc::new(AbilityDefinition::new("GA_Ice").tagged("Ability.Skill"));
        let a = system.give_ability(fire, 1, source());
        let b = system.give_ability(ice, 1, source());
        let tags = TagContainer::new();

        system.begin_activation(a, &tags).expect("fire 1");
        system.begin_activation(a, &tags).expect("fire 2");
        system.begin_activation(b, &tags).expect("ice");

        let running = system.active_abilities_with_tags(&TagContainer::single("Ability.Skill"));
        assert_eq!(running.len(), 3);
        assert_eq!(running.iter().filter(|t| t.spec == a).count(), 2);
    }

    #[test]
    fn clearing_active_spec_is_deferred_until_it_ends() {
        let mut system = ready_system();
        let handle = system.give_ability(Arc::new(AbilityDefinition::new("GA_Melee")), 1, source());
        let token = system.begin_activation(handle, &TagContainer::new()).expect("activate");
        system.mark_committed(token).expect("commit");

        assert!(matches!(system.clear_ability(handle), ClearOutcome::Deferred));
        assert!(!system.is_live(handle));
        assert_eq!(
            system.begin_activation(handle, &TagContainer::new()),
            Err(ActivationError::PendingRemoval(handle))
        );

        assert_eq!(system.end_activation(token), Ok(EndOutcome::EndedAndRemoved));
        assert!(system.spec(handle).is_none());
    }

    #[test]
    fn cleared_spec_reports_removed_state() {
        let mut system = ready_system();
        let handle = system.give_ability(Arc::new(AbilityDefinition::new("GA_Melee")), 1, source());
        match system.clear_ability(handle) {
            ClearOutcome::Removed(spec) => {
                assert_eq!(spec.state(), AbilityState::Removed)
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(matches!(system.clear_ability(handle), ClearOutcome::NotFound));
    }

    #[test]
    fn cost_check_rejects_overdraw() {
        let cost = EffectDefinition::instant("GE_Cost").modifier(AttributeKind::Mana, ModifierOp::Additive, -10.0);
        let spec = EffectSpec::new(
            Arc::new(cost),
            1,
            EffectContext::default(),
            AttributeSet::new().snapshot(),
            TagContainer::new(),
        );
        let poor = AttributeSet::new()
            .with_base(AttributeKind::MaxMana, 50.0)
            .with_base(AttributeKind::Mana, 5.0);
        let rich = poor.clone().with_base(AttributeKind::Mana, 10.0);

        assert_eq!(unaffordable_cost(&spec, &poor), Some(AttributeKind::Mana));
        assert_eq!(unaffordable_cost(&spec, &rich), None);
    }
}
