use crate::attribute::AttributeKind;
use crate::error::{ErrorSeverity, GameError};

use super::spec::AbilitySpecHandle;

/// Why an ability could not be activated or committed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ActivationError {
    #[error("ability {0} is not granted")]
    NotGranted(AbilitySpecHandle),

    #[error("ability {0} is waiting for removal")]
    PendingRemoval(AbilitySpecHandle),

    #[error("ability {0} was granted before its owner was initialized")]
    NotActivatable(AbilitySpecHandle),

    #[error("no ability bound to the requested slot")]
    EmptySlot,

    #[error("no granted ability matches the requested tags")]
    NoMatchingAbility,

    #[error("ability is on cooldown")]
    OnCooldown,

    #[error("cannot pay {0} cost")]
    InsufficientCost(AttributeKind),

    #[error("owner has a blocking tag")]
    Blocked,

    #[error("owner lacks a required tag")]
    MissingRequiredTags,

    #[error("instance limit reached ({limit})")]
    InstanceLimit { limit: usize },

    #[error("activation token is stale")]
    UnknownInstance,

    #[error("granting abilities requires authority")]
    NotAuthoritative,
}

impl GameError for ActivationError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::OnCooldown
            | Self::InsufficientCost(_)
            | Self::Blocked
            | Self::MissingRequiredTags
            | Self::InstanceLimit { .. } => ErrorSeverity::Recoverable,
            Self::NotGranted(_)
            | Self::PendingRemoval(_)
            | Self::NotActivatable(_)
            | Self::EmptySlot
            | Self::NoMatchingAbility
            | Self::NotAuthoritative => ErrorSeverity::Validation,
            Self::UnknownInstance => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotGranted(_) => "ABILITY_NOT_GRANTED",
            Self::PendingRemoval(_) => "ABILITY_PENDING_REMOVAL",
            Self::NotActivatable(_) => "ABILITY_NOT_ACTIVATABLE",
            Self::EmptySlot => "ABILITY_EMPTY_SLOT",
            Self::NoMatchingAbility => "ABILITY_NO_MATCH",
            Self::OnCooldown => "ABILITY_ON_COOLDOWN",
            Self::InsufficientCost(_) => "ABILITY_INSUFFICIENT_COST",
            Self::Blocked => "ABILITY_BLOCKED",
            Self::MissingRequiredTags => "ABILITY_MISSING_TAGS",
            Self::InstanceLimit { .. } => "ABILITY_INSTANCE_LIMIT",
            Self::UnknownInstance => "ABILITY_UNKNOWN_INSTANCE",
            Self::NotAuthoritative => "ABILITY_NOT_AUTHORITATIVE",
        }
    }
}
