use std::sync::Arc;

use arpg_core::{
    AbilityDefinition, AttributeKind, AttributeSet, Character, EntityId, GameConfig, ItemCatalog,
    ItemDefinition, ItemId, ItemRegistry, ItemSlot, ItemType,
};
use arpg_runtime::{
    InMemorySaveRepository, PlayerSession, RuntimeError, SaveConfig, SaveKey, SaveRepository,
};

const HERO: EntityId = EntityId(1);

fn sword() -> ItemId {
    ItemId::new(ItemType::Weapon, "Sword")
}

fn axe() -> ItemId {
    ItemId::new(ItemType::Weapon, "Axe")
}

fn potion() -> ItemId {
    ItemId::new(ItemType::Potion, "Health")
}

fn catalog() -> Arc<dyn ItemRegistry> {
    Arc::new(ItemCatalog::from_definitions([
        ItemDefinition::new(ItemType::Weapon, "Sword")
            .granting(Arc::new(AbilityDefinition::new("GA_Slash")), 2),
        ItemDefinition::new(ItemType::Weapon, "Axe")
            .granting(Arc::new(AbilityDefinition::new("GA_Cleave")), 3),
        ItemDefinition::new(ItemType::Potion, "Health").with_max_count(0),
    ]))
}

fn hero() -> Character {
    Character::new(HERO, 1).with_attributes(
        AttributeSet::new()
            .with_base(AttributeKind::MaxHealth, 100.0)
            .with_base(AttributeKind::Health, 100.0),
    )
}

fn weapon_slot() -> ItemSlot {
    ItemSlot::new(ItemType::Weapon, 0)
}

fn slot_ability(session: &PlayerSession, slot: &ItemSlot) -> Option<(String, u32)> {
    let player = session.player()?;
    let handle = player.slotted_abilities().get(slot)?;
    let spec = player.abilities().spec(*handle)?;
    Some((spec.definition.id.0.clone(), spec.level))
}

async fn start(repository: Arc<dyn SaveRepository>) -> PlayerSession {
    PlayerSession::builder()
        .game_config(GameConfig::new().with_default_item(sword(), 1, 1))
        .save_config(SaveConfig::new("unused"))
        .repository(repository)
        .items(catalog())
        .player(hero())
        .build()
        .await
        .expect("session")
}

#[tokio::test]
async fn fresh_session_slots_default_items_and_grants_their_abilities() {
    let session = start(Arc::new(InMemorySaveRepository::new())).await;

    assert!(!session.save_found());
    assert_eq!(session.player_id(), HERO);
    assert_eq!(session.inventory().item_count(&sword()), 1);
    assert_eq!(
        session.inventory().slotted_item(&weapon_slot()).map(|item| item.id.clone()),
        Some(sword())
    );
    assert_eq!(slot_ability(&session, &weapon_slot()), Some(("GA_Slash".into(), 2)));
    assert!(session.player().expect("player").abilities_initialized());
}

#[tokio::test]
async fn equipping_swaps_the_slot_ability() {
    let mut session = start(Arc::new(InMemorySaveRepository::new())).await;

    assert!(session.add_item(&axe(), 1, 1));
    // the weapon slot is taken, so the axe is only held
    assert_eq!(slot_ability(&session, &weapon_slot()).map(|a| a.0), Some("GA_Slash".into()));

    assert!(session.set_slotted_item(weapon_slot(), Some(&axe())));
    assert_eq!(slot_ability(&session, &weapon_slot()), Some(("GA_Cleave".into(), 3)));
    assert_eq!(session.player().expect("player").abilities().len(), 1);

    assert!(session.set_slotted_item(weapon_slot(), None));
    assert_eq!(slot_ability(&session, &weapon_slot()), None);

    assert!(!session.set_slotted_item(weapon_slot(), Some(&ItemId::new(ItemType::Weapon, "Missing"))));
}

#[tokio::test]
async fn inventory_changes_persist_across_sessions() {
    let repository: Arc<dyn SaveRepository> = Arc::new(InMemorySaveRepository::new());

    let mut first = start(Arc::clone(&repository)).await;
    assert!(first.add_item(&potion(), 3, 1));
    assert!(first.add_item(&axe(), 1, 1));
    assert!(first.set_slotted_item(weapon_slot(), Some(&axe())));
    let status = first.wait_for_saves().await;
    assert!(status.completed >= 1);
    assert_eq!(status.failed, 0);

    let second = start(repository).await;
    assert!(second.save_found());
    assert_eq!(second.inventory().item_count(&potion()), 3);
    assert_eq!(second.inventory().item_count(&axe()), 1);
    assert_eq!(slot_ability(&second, &weapon_slot()).map(|a| a.0), Some("GA_Cleave".into()));
}

#[tokio::test]
async fn auto_slotting_on_load_is_saved() {
    let repository: Arc<dyn SaveRepository> = Arc::new(InMemorySaveRepository::new());
    let session = start(Arc::clone(&repository)).await;
    let status = session.wait_for_saves().await;
    assert_eq!(status.completed, 1);

    let (slot, user_index) = session.saves().save_slot_info();
    let bytes = repository
        .load(&SaveKey::new(slot, user_index))
        .expect("load")
        .expect("stored save");
    let stored = arpg_core::save::decode_save(&bytes).expect("decode").record;
    assert_eq!(stored.slots.get(&weapon_slot()), Some(&Some(sword())));
}

#[tokio::test]
async fn activating_the_weapon_slot_runs_its_ability() {
    let mut session = start(Arc::new(InMemorySaveRepository::new())).await;

    let token = session.activate_slot(&weapon_slot()).expect("activate");
    let player = session.player_mut().expect("player");
    assert!(player.abilities().spec(token.spec).expect("spec").is_active());
    player.end_ability(token).expect("end");
}

#[tokio::test]
async fn reset_save_restores_default_inventory() {
    let mut session = start(Arc::new(InMemorySaveRepository::new())).await;
    session.add_item(&potion(), 5, 1);
    session.remove_item(&sword(), 0);
    assert_eq!(slot_ability(&session, &weapon_slot()), None);

    session.reset_save();

    assert_eq!(session.inventory().item_count(&potion()), 0);
    assert_eq!(session.inventory().item_count(&sword()), 1);
    assert_eq!(slot_ability(&session, &weapon_slot()).map(|a| a.0), Some("GA_Slash".into()));
}

#[tokio::test]
async fn leveling_up_keeps_slot_abilities_bound() {
    let mut session = start(Arc::new(InMemorySaveRepository::new())).await;
    assert!(session.set_player_level(4));
    assert_eq!(session.player().map(Character::level), Some(4));
    // weapons carry their own ability level
    assert_eq!(slot_ability(&session, &weapon_slot()), Some(("GA_Slash".into(), 2)));
}

#[tokio::test]
async fn builder_requires_items_and_player() {
    let missing = PlayerSession::builder()
        .repository(Arc::new(InMemorySaveRepository::new()))
        .player(hero())
        .build()
        .await;
    assert!(matches!(missing, Err(RuntimeError::MissingComponent("item registry"))));
}
