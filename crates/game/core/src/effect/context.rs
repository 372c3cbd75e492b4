use crate::entity::{ActorInfo, EntityId, SourceObject};
use crate::targeting::HitResult;

/// Who and what produced an effect spec.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EffectContext {
    /// Ownership record of the applying character.
    pub instigator: Option<ActorInfo>,
    /// Physical object that delivered the effect (projectile, weapon actor).
    pub effect_causer: Option<EntityId>,
    pub source_object: Option<SourceObject>,
    pub hit_result: Option<HitResult>,
}

impl EffectContext {
    pub fn from_instigator(instigator: ActorInfo) -> Self {
        Self {
            instigator: Some(instigator),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_causer(mut self, causer: EntityId) -> Self {
        self.effect_causer = Some(causer);
        self
    }

    #[must_use]
    pub fn with_source_object(mut self, source: SourceObject) -> Self {
        self.source_object = Some(source);
        self
    }

    #[must_use]
    pub fn with_hit_result(mut self, hit: HitResult) -> Self {
        self.hit_result = Some(hit);
        self
    }
}

/// Instigator and causer reported with a damage notification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DamageAttribution {
    pub instigator: Option<EntityId>,
    pub causer: Option<EntityId>,
}

impl DamageAttribution {
    /// Resolution order:
    ///
    /// - controller: the player controller, else the avatar's own controller
    /// - instigator: that controller's pawn when a controller exists, else the avatar
    /// - causer: the explicit effect causer, else the avatar
    ///
    /// Nothing is attributed when the context has no avatar.
    pub fn resolve(context: &EffectContext) -> Self {
        let Some(info) = context.instigator else {
            return Self::default();
        };
        let Some(avatar) = info.avatar else {
            return Self::default();
        };

        let instigator = match info.controller() {
            Some(controller) => controller.pawn,
            None => Some(avatar),
        };

        Self {
            instigator,
            causer: context.effect_causer.or(Some(avatar)),
        }
    }
}
