//! Keeps slot-bound abilities in sync with slot contents.
//!
//! The desired binding of each slot comes from the character's default slot
//! abilities, overridden by whatever item sits in the slot. Reconciliation
//! first collects every stale grant, revokes them, then grants whatever is
//! still missing. The grant table is never mutated while it is being read.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use super::Character;
use crate::ability::{AbilityDefinition, AbilitySpecHandle, ClearOutcome};
use crate::entity::SourceObject;
use crate::inventory::{InventorySource, ItemSlot};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReconcileMode {
    /// Revoke stale grants, then grant missing ones.
    Refresh,
    /// Revoke every slot grant and grant nothing.
    RemoveAll,
}

/// The ability a slot should grant.
#[derive(Clone, Debug)]
pub struct SlotBinding {
    pub ability: Arc<AbilityDefinition>,
    pub level: u32,
    pub source: SourceObject,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub revoked: Vec<(ItemSlot, AbilitySpecHandle)>,
    pub granted: Vec<(ItemSlot, AbilitySpecHandle)>,
}

impl ReconcileReport {
    pub fn is_empty(&self) -> bool {
        self.revoked.is_empty() && self.granted.is_empty()
    }
}

impl Character {
    /// Desired slot bindings: defaults at the character level, overridden by
    /// slotted items that grant an ability.
    pub fn desired_slot_bindings(&self, inventory: Option<&dyn InventorySource>) -> BTreeMap<ItemSlot, SlotBinding> {
        let mut desired: BTreeMap<ItemSlot, SlotBinding> = self
            .default_slotted_abilities
            .iter()
            .map(|(slot, ability)| {
                (
                    *slot,
                    SlotBinding {
                        ability: Arc::clone(ability),
                        level: self.level,
                        source: SourceObject::Character(self.id),
                    },
                )
            })
            .collect();

        if let Some(inventory) = inventory {
            for (slot, item) in inventory.slotted_item_map() {
                let Some(ability) = &item.granted_ability else {
                    continue;
                };
                desired.insert(
                    slot,
                    SlotBinding {
                        ability: Arc::clone(ability),
                        level: item.granted_ability_level(self.level),
                        source: SourceObject::Item(item.id.clone()),
                    },
                );
            }
        }
        desired
    }

    /// Brings slot grants in line with the desired bindings.
    ///
    /// A grant is revoked when everything is being removed, when its handle no
    /// longer resolves, when its slot has no desired binding, or when the
    /// desired ability or source differs. Running it twice with no state change
    /// in between does nothing the second time.
    pub fn reconcile_slot_abilities(
        &mut self,
        mode: ReconcileMode,
        inventory: Option<&dyn InventorySource>,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        if !self.authority {
            return report;
        }

        let desired = self.desired_slot_bindings(inventory);

        let stale: Vec<(ItemSlot, AbilitySpecHandle)> = self
            .slotted_abilities
            .iter()
            .filter(|(slot, handle)| {
                if mode == ReconcileMode::RemoveAll || !self.abilities.is_live(**handle) {
                    return true;
                }
                let (Some(binding), Some(spec)) = (desired.get(*slot), self.abilities.spec(**handle)) else {
                    return true;
                };
                binding.ability.id != spec.definition.id || binding.source != spec.source
            })
            .map(|(slot, handle)| (*slot, *handle))
            .collect();

        for (slot, handle) in stale {
            self.slotted_abilities.remove(&slot);
            if matches!(self.abilities.clear_ability(handle), ClearOutcome::Deferred) {
                debug!(character = %self.id, %slot, %handle, "slot ability revoked after it ends");
            }
            report.revoked.push((slot, handle));
        }

        if mode == ReconcileMode::RemoveAll {
            return report;
        }

        for (slot, binding) in desired {
            if self.slotted_abilities.contains_key(&slot) {
                continue;
            }
            let handle = self
                .abilities
                .give_ability(binding.ability, binding.level, binding.source);
            self.slotted_abilities.insert(slot, handle);
            report.granted.push((slot, handle));
        }

        if !report.is_empty() {
            debug!(
                character = %self.id,
                revoked = report.revoked.len(),
                granted = report.granted.len(),
                "reconciled slot abilities"
            );
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityId;
    use crate::inventory::{ItemDefinition, ItemType};

    #[derive(Default)]
    struct Slots(BTreeMap<ItemSlot, Arc<ItemDefinition>>);

    impl InventorySource for Slots {
        fn slotted_item_map(&self) -> BTreeMap<ItemSlot, Arc<ItemDefinition>> {
            self.0.clone()
        }
    }

    fn weapon_slot() -> ItemSlot {
        ItemSlot::new(ItemType::Weapon, 0)
    }

    fn skill_slot() -> ItemSlot {
        ItemSlot::new(ItemType::Skill, 0)
    }

    fn punch() -> Arc<AbilityDefinition> {
        Arc::new(AbilityDefinition::new("GA_Punch"))
    }

    fn sword(level: i32) -> Arc<ItemDefinition> {
        Arc::new(
            ItemDefinition::new(ItemType::Weapon, "Sword")
                .granting(Arc::new(AbilityDefinition::new("GA_Slash")), level),
        )
    }

    fn character() -> Character {
        let mut character = Character::new(EntityId(1), 2).with_default_slotted_ability(weapon_slot(), punch());
        character.possess(None, 0.0);
        character
    }

    fn ability_in(character: &Character, slot: &ItemSlot) -> Option<(String, u32, SourceObject)> {
        let handle = character.slotted_abilities().get(slot)?;
        let spec = character.abilities().spec(*handle)?;
        Some((spec.definition.id.0.clone(), spec.level, spec.source.clone()))
    }

    #[test]
    fn default_binding_is_granted_on_possession() {
        let character = character();
        assert_eq!(
            ability_in(&character, &weapon_slot()),
            Some(("GA_Punch".into(), 2, SourceObject::Character(EntityId(1))))
        );
    }

    #[test]
    fn slotted_item_overrides_default_binding() {
        let mut character = character();
        let mut slots = Slots::default();
        slots.0.insert(weapon_slot(), sword(4));

        let report = character.refresh_slotted_abilities(&slots);
        assert_eq!(report.revoked.len(), 1);
        assert_eq!(report.granted.len(), 1);
        assert_eq!(character.abilities().len(), 1);
        assert_eq!(
            ability_in(&character, &weapon_slot()),
            Some((
                "GA_Slash".into(),
                4,
                SourceObject::Item(sword(4).id.clone())
            ))
        );

        slots.0.clear();
        character.refresh_slotted_abilities(&slots);
        assert_eq!(ability_in(&character, &weapon_slot()).map(|a| a.0), Some("GA_Punch".into()));
    }

    #[test]
    fn second_refresh_is_a_no_op() {
        let mut character = character();
        let mut slots = Slots::default();
        slots.0.insert(weapon_slot(), sword(1));
        slots.0.insert(
            skill_slot(),
            Arc::new(
                ItemDefinition::new(ItemType::Skill, "Fireball")
                    .granting(Arc::new(AbilityDefinition::new("GA_Fireball")), 1),
            ),
        );

        assert!(!character.refresh_slotted_abilities(&slots).is_empty());
        assert!(character.refresh_slotted_abilities(&slots).is_empty());
        assert_eq!(character.abilities().len(), 2);
    }

    #[test]
    fn skill_items_follow_character_level() {
        let mut character = character();
        let mut slots = Slots::default();
        slots.0.insert(
            skill_slot(),
            Arc::new(
                ItemDefinition::new(ItemType::Skill, "Fireball")
                    .granting(Arc::new(AbilityDefinition::new("GA_Fireball")), 5),
            ),
        );
        character.refresh_slotted_abilities(&slots);
        assert_eq!(ability_in(&character, &skill_slot()).map(|a| a.1), Some(2));
    }

    #[test]
    fn externally_cleared_grant_is_replaced() {
        let mut character = character();
        let handle = character.slotted_abilities()[&weapon_slot()];
        character.clear_ability(handle);

        let report = character.refresh_slotted_abilities(&Slots::default());
        assert_eq!(report.revoked, vec![(weapon_slot(), handle)]);
        assert_eq!(report.granted.len(), 1);
        assert!(character.abilities().is_live(character.slotted_abilities()[&weapon_slot()]));
    }

    #[test]
    fn remove_all_revokes_without_regranting() {
        let mut character = character();
        let report = character.reconcile_slot_abilities(ReconcileMode::RemoveAll, None);
        assert_eq!(report.revoked.len(), 1);
        assert!(report.granted.is_empty());
        assert!(character.slotted_abilities().is_empty());
        assert!(character.abilities().is_empty());
    }

    #[test]
    fn running_slot_ability_is_removed_when_it_ends() {
        let mut character = character();
        let token = character
            .activate_ability_with_slot(&weapon_slot())
            .expect("activate");

        let mut slots = Slots::default();
        slots.0.insert(weapon_slot(), sword(1));
        character.refresh_slotted_abilities(&slots);

        assert_eq!(character.abilities().len(), 2);
        character.end_ability(token).expect("end");
        assert_eq!(character.abilities().len(), 1);
        assert_eq!(ability_in(&character, &weapon_slot()).map(|a| a.0), Some("GA_Slash".into()));
    }
}
