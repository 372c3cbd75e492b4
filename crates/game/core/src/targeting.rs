//! Target data and targeting rules.
//!
//! Target data is a sum type: either a single hit (with impact information) or
//! a plain list of actors. One activation can merge several of each into a
//! [`TargetDataHandle`].

use std::fmt;
use std::sync::Arc;

use crate::entity::EntityId;
use crate::tag::GameplayTag;

/// Result of a trace or overlap that produced a target.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HitResult {
    pub actor: Option<EntityId>,
    pub location: [f32; 3],
    pub normal: [f32; 3],
}

impl HitResult {
    pub fn on_actor(actor: EntityId) -> Self {
        Self {
            actor: Some(actor),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn at(mut self, location: [f32; 3]) -> Self {
        self.location = location;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetData {
    SingleHit(HitResult),
    ActorList(Vec<EntityId>),
}

impl TargetData {
    pub fn actors(&self) -> Vec<EntityId> {
        match self {
            Self::SingleHit(hit) => hit.actor.into_iter().collect(),
            Self::ActorList(actors) => actors.clone(),
        }
    }

    pub fn hit_result(&self) -> Option<&HitResult> {
        match self {
            Self::SingleHit(hit) => Some(hit),
            Self::ActorList(_) => None,
        }
    }
}

/// Ordered collection of target data produced by one activation.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetDataHandle {
    data: Vec<TargetData>,
}

impl TargetDataHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Each hit becomes its own entry; all actors share one list entry.
    pub fn add_targets(&mut self, hits: Vec<HitResult>, actors: Vec<EntityId>) {
        self.data.extend(hits.into_iter().map(TargetData::SingleHit));
        if !actors.is_empty() {
            self.data.push(TargetData::ActorList(actors));
        }
    }

    pub fn push(&mut self, data: TargetData) {
        self.data.push(data);
    }

    pub fn iter(&self) -> impl Iterator<Item = &TargetData> {
        self.data.iter()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Payload attached to a gameplay event that triggered an ability step.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameplayEventData {
    pub event_tag: Option<GameplayTag>,
    pub instigator: Option<EntityId>,
    pub target: Option<EntityId>,
    pub magnitude: f32,
    pub hit_result: Option<HitResult>,
}

impl GameplayEventData {
    pub fn targeting(target: EntityId) -> Self {
        Self {
            target: Some(target),
            ..Self::default()
        }
    }

    pub fn with_hit(hit: HitResult) -> Self {
        Self {
            hit_result: Some(hit),
            ..Self::default()
        }
    }
}

/// The activating entity as seen by a targeting rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetingContext {
    pub owner: EntityId,
    pub avatar: Option<EntityId>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TargetingOutput {
    pub hits: Vec<HitResult>,
    pub actors: Vec<EntityId>,
}

/// Computes the targets of an effect container.
pub trait TargetingRule: Send + Sync + fmt::Debug {
    fn targets(&self, context: &TargetingContext, event: &GameplayEventData) -> TargetingOutput;
}

/// Targeting rule attached to an effect container.
#[derive(Clone, Debug)]
pub enum TargetType {
    /// The activating character itself.
    UseOwner,
    /// The hit result of the event payload, else its target actor.
    UseEventData,
    /// Host-provided rule.
    Custom(Arc<dyn TargetingRule>),
}

impl TargetingRule for TargetType {
    fn targets(&self, context: &TargetingContext, event: &GameplayEventData) -> TargetingOutput {
        let mut output = TargetingOutput::default();
        match self {
            Self::UseOwner => output.actors.push(context.avatar.unwrap_or(context.owner)),
            Self::UseEventData => {
                if let Some(hit) = &event.hit_result {
                    output.hits.push(hit.clone());
                } else if let Some(target) = event.target {
                    output.actors.push(target);
                }
            }
            Self::Custom(rule) => return rule.targets(context, event),
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> TargetingContext {
        TargetingContext {
            owner: EntityId(1),
            avatar: Some(EntityId(1)),
        }
    }

    #[test]
    fn use_owner_targets_activating_avatar() {
        let output = TargetType::UseOwner.targets(&context(), &GameplayEventData::default());
        assert_eq!(output.actors, vec![EntityId(1)]);
        assert!(output.hits.is_empty());
    }

    #[test]
    fn use_event_data_prefers_hit_result() {
        let hit = HitResult::on_actor(EntityId(4)).at([1.0, 2.0, 0.0]);
        let mut event = GameplayEventData::with_hit(hit.clone());
        event.target = Some(EntityId(5));

        let output = TargetType::UseEventData.targets(&context(), &event);
        assert_eq!(output.hits, vec![hit]);
        assert!(output.actors.is_empty());

        let output =
            TargetType::UseEventData.targets(&context(), &GameplayEventData::targeting(EntityId(5)));
        assert_eq!(output.actors, vec![EntityId(5)]);
    }

    #[test]
    fn handle_merges_hits_and_one_actor_list() {
        let mut handle = TargetDataHandle::new();
        handle.add_targets(
            vec![HitResult::on_actor(EntityId(2)), HitResult::default()],
            vec![EntityId(3), EntityId(4)],
        );
        handle.add_targets(Vec::new(), Vec::new());

        assert_eq!(handle.len(), 3);
        let actors: Vec<EntityId> = handle.iter().flat_map(TargetData::actors).collect();
        assert_eq!(actors, vec![EntityId(2), EntityId(3), EntityId(4)]);
    }
}
