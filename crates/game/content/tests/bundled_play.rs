//! Plays the bundled abilities end to end through the core world.

use arpg_content::ContentLibrary;
use arpg_core::{
    AbilityId, ActivationError, EntityId, GameplayEventData, GameplayTag, HitResult, SourceObject,
    World,
};

const PLAYER: EntityId = EntityId(1);
const GOBLIN: EntityId = EntityId(2);

fn world(library: &ContentLibrary) -> World {
    let mut world = World::new();
    for (name, id) in [("Player", PLAYER), ("Goblin", GOBLIN)] {
        let mut character = library.spawn_character(name, id).expect("character");
        character.possess(None, world.now());
        world.spawn(character);
    }
    world
}

#[test]
fn fireball_pays_cost_damages_and_cools_down() {
    let library = ContentLibrary::bundled().expect("bundled content");
    let mut world = world(&library);
    let fireball = library
        .ability(&AbilityId::from("GA_Fireball"))
        .expect("fireball");

    let now = world.now();
    let player = world.character_mut(PLAYER).expect("player");
    let handle = player
        .give_ability(fireball, 1, SourceObject::Character(PLAYER))
        .expect("grant");
    let mana_before = player.mana();
    let token = player.try_activate_ability(handle).expect("activate");
    player.commit_ability(token, now).expect("commit");
    assert_eq!(player.mana(), mana_before - 20.0);

    let event = GameplayEventData::with_hit(HitResult::on_actor(GOBLIN));
    let applied = world.apply_effect_container(PLAYER, token, &GameplayTag::new("Event.Montage.Hit"), &event, None);
    assert_eq!(applied.len(), 2);

    let goblin = world.character(GOBLIN).expect("goblin");
    assert!(goblin.health() <= 35.0);
    assert!(goblin.owned_tags().has_tag(&GameplayTag::new("Status.Burning")));

    let player = world.character_mut(PLAYER).expect("player");
    player.end_ability(token).expect("end");
    assert!(matches!(
        player.try_activate_ability(handle),
        Err(ActivationError::OnCooldown)
    ));

    world.advance(3.5);
    let goblin = world.character(GOBLIN).expect("goblin");
    assert!(!goblin.owned_tags().has_tag(&GameplayTag::new("Status.Burning")));
    let player = world.character_mut(PLAYER).expect("player");
    assert!(player.try_activate_ability(handle).is_ok());
}

#[test]
fn player_punches_until_a_weapon_is_slotted() {
    let library = ContentLibrary::bundled().expect("bundled content");
    let world = world(&library);
    let player = world.character(PLAYER).expect("player");

    let slotted: Vec<String> = player
        .slotted_abilities()
        .values()
        .filter_map(|handle| player.abilities().spec(*handle))
        .map(|spec| spec.definition.id.to_string())
        .collect();
    assert_eq!(slotted, vec!["GA_Punch".to_string()]);
}
