use std::fmt;
use std::sync::Arc;

use arrayvec::ArrayVec;

use super::definition::{AbilityDefinition, InstancingPolicy};
use crate::config::GameConfig;
use crate::entity::SourceObject;

/// Handle to a granted ability inside one grant table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AbilitySpecHandle(pub(crate) u32);

impl fmt::Display for AbilitySpecHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ability#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceId(pub(crate) u32);

/// Lifecycle of a granted ability.
///
/// ```text
/// Granted -> Activatable -> Activating -> Committed -> Activatable
///                               \-> (failed / cancelled) -> Activatable
/// ```
///
/// `Removed` is terminal and only reported on specs handed back by a clear.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum AbilityState {
    Granted,
    Activatable,
    Activating,
    Committed,
    Removed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InstanceState {
    Activating,
    Committed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AbilityInstance {
    pub id: InstanceId,
    pub state: InstanceState,
}

/// Identifies one running activation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ActivationToken {
    pub spec: AbilitySpecHandle,
    pub instance: InstanceId,
}

pub type AbilityInstances = ArrayVec<AbilityInstance, { GameConfig::MAX_ABILITY_INSTANCES }>;

/// A granted ability: definition, level and the object that granted it.
#[derive(Clone, Debug)]
pub struct AbilitySpec {
    pub handle: AbilitySpecHandle,
    pub definition: Arc<AbilityDefinition>,
    pub level: u32,
    pub source: SourceObject,
    pub(crate) ready: bool,
    pub(crate) removed: bool,
    pub(crate) pending_remove: bool,
    pub(crate) instances: AbilityInstances,
    pub(crate) actor_instance: Option<InstanceId>,
}

impl AbilitySpec {
    pub(crate) fn new(
        handle: AbilitySpecHandle,
        definition: Arc<AbilityDefinition>,
        level: u32,
        source: SourceObject,
        ready: bool,
    ) -> Self {
        Self {
            handle,
            definition,
            level: level.max(1),
            source,
            ready,
            removed: false,
            pending_remove: false,
            instances: AbilityInstances::new(),
            actor_instance: None,
        }
    }

    pub fn state(&self) -> AbilityState {
        if self.removed {
            AbilityState::Removed
        } else if self.instances.iter().any(|i| i.state == InstanceState::Committed) {
            AbilityState::Committed
        } else if !self.instances.is_empty() {
            AbilityState::Activating
        } else if self.ready {
            AbilityState::Activatable
        } else {
            AbilityState::Granted
        }
    }

    pub fn is_active(&self) -> bool {
        !self.instances.is_empty()
    }

    pub fn is_pending_remove(&self) -> bool {
        self.pending_remove
    }

    pub fn instances(&self) -> &[AbilityInstance] {
        &self.instances
    }

    pub fn instance_limit(&self) -> usize {
        match self.definition.instancing {
            InstancingPolicy::NonInstanced | InstancingPolicy::InstancedPerActor => 1,
            InstancingPolicy::InstancedPerExecution => GameConfig::MAX_ABILITY_INSTANCES,
        }
    }
}
