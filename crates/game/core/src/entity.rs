//! Entity identity and ownership records.
//!
//! The host owns actor lifecycle; the core only sees opaque ids plus the
//! owner/avatar/controller relationships needed for notifications and for
//! resolving who caused a hit.
use core::fmt;

use crate::inventory::ItemId;

/// Opaque handle to a character known to the [`World`](crate::world::World).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaque handle to a controller (player or AI).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControllerId(pub u32);

/// A controller and the pawn it currently possesses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControllerInfo {
    pub id: ControllerId,
    pub pawn: Option<EntityId>,
}

impl ControllerInfo {
    pub fn new(id: ControllerId, pawn: Option<EntityId>) -> Self {
        Self { id, pawn }
    }
}

/// Ownership record of an ability-system owner.
///
/// `owner` is the logical owner of the grant table, `avatar` the physical
/// representation in the world. For player characters both are the same
/// entity. `player_controller` is only set for player-driven owners;
/// `avatar_controller` is whatever controller currently possesses the avatar
/// when the avatar is a pawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorInfo {
    pub owner: EntityId,
    pub avatar: Option<EntityId>,
    pub player_controller: Option<ControllerInfo>,
    pub avatar_controller: Option<ControllerInfo>,
}

impl ActorInfo {
    /// Owner and avatar are the same entity, no controller attached yet.
    pub fn for_entity(id: EntityId) -> Self {
        Self {
            owner: id,
            avatar: Some(id),
            player_controller: None,
            avatar_controller: None,
        }
    }

    #[must_use]
    pub fn with_player_controller(mut self, controller: ControllerInfo) -> Self {
        self.player_controller = Some(controller);
        self
    }

    #[must_use]
    pub fn with_avatar_controller(mut self, controller: ControllerInfo) -> Self {
        self.avatar_controller = Some(controller);
        self
    }

    #[must_use]
    pub fn without_avatar(mut self) -> Self {
        self.avatar = None;
        self
    }

    /// Player controller first, then the avatar's own controller.
    pub fn controller(&self) -> Option<ControllerInfo> {
        self.player_controller.or(self.avatar_controller)
    }
}

/// The object that granted an ability or applied an effect.
///
/// Slot reconciliation compares sources to tell a weapon-granted ability from
/// the same ability granted by the character's defaults.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SourceObject {
    Character(EntityId),
    Item(ItemId),
}

impl fmt::Display for SourceObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Character(id) => write!(f, "character {id}"),
            Self::Item(item) => write!(f, "item {item}"),
        }
    }
}
