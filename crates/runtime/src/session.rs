//! A single player's session: world, inventory and save service wired
//! together.
//!
//! The session owns the player's [`Inventory`] next to the [`World`] holding
//! the player's [`Character`], and re-syncs slot-granted abilities whenever
//! the inventory reports a slot change or a reload.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use arpg_core::effect::TickOutcome;
use arpg_core::{
    ActivationError, ActivationToken, Character, EntityId, GameConfig, Inventory, InventoryEvent,
    ItemId, ItemRegistry, ItemSlot, ReconcileReport, TagContainer, World,
};

use crate::config::SaveConfig;
use crate::error::{Result, RuntimeError};
use crate::repository::SaveRepository;
use crate::save::SaveGameService;
use crate::workers::WriterStatus;

/// Player session orchestrating gameplay state and persistence.
pub struct PlayerSession {
    world: World,
    player: EntityId,
    inventory: Inventory,
    saves: SaveGameService,
    items: Arc<dyn ItemRegistry>,
    slots_dirty: Arc<AtomicBool>,
    save_found: bool,
}

impl PlayerSession {
    /// Create a new session builder
    pub fn builder() -> PlayerSessionBuilder {
        PlayerSessionBuilder::new()
    }

    // ===== accessors =====

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn player_id(&self) -> EntityId {
        self.player
    }

    pub fn player(&self) -> Option<&Character> {
        self.world.character(self.player)
    }

    pub fn player_mut(&mut self) -> Option<&mut Character> {
        self.world.character_mut(self.player)
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn saves(&self) -> &SaveGameService {
        &self.saves
    }

    pub fn saves_mut(&mut self) -> &mut SaveGameService {
        &mut self.saves
    }

    pub fn items(&self) -> &Arc<dyn ItemRegistry> {
        &self.items
    }

    /// Whether an existing save was found when the session started.
    pub fn save_found(&self) -> bool {
        self.save_found
    }

    /// Adds a non-player character to the world.
    pub fn spawn(&mut self, character: Character) -> EntityId {
        self.world.spawn(character)
    }

    // ===== inventory =====

    /// Adds `count` of the registered item `id` and auto-slots it.
    pub fn add_item(&mut self, id: &ItemId, count: i32, level: i32) -> bool {
        let item = self.resolve(id);
        let added = self.inventory.add_item(item.as_ref(), count, level, true);
        self.sync_slotted_abilities();
        added
    }

    pub fn remove_item(&mut self, id: &ItemId, count: i32) -> bool {
        let item = self.resolve(id);
        let removed = self.inventory.remove_item(item.as_ref(), count);
        self.sync_slotted_abilities();
        removed
    }

    /// Puts the registered item `id` into `slot`, or empties it with `None`.
    pub fn set_slotted_item(&mut self, slot: ItemSlot, id: Option<&ItemId>) -> bool {
        let item = match id {
            Some(id) => match self.resolve(id) {
                Some(item) => Some(item),
                None => return false,
            },
            None => None,
        };
        let changed = self.inventory.set_slotted_item(slot, item.as_ref());
        self.sync_slotted_abilities();
        changed
    }

    pub fn fill_empty_slots(&mut self) {
        self.inventory.fill_empty_slots();
        self.sync_slotted_abilities();
    }

    // ===== abilities =====

    pub fn activate_slot(&mut self, slot: &ItemSlot) -> std::result::Result<ActivationToken, ActivationError> {
        match self.world.character_mut(self.player) {
            Some(player) => player.activate_ability_with_slot(slot),
            None => Err(ActivationError::NotAuthoritative),
        }
    }

    pub fn activate_with_tags(&mut self, tags: &TagContainer) -> Vec<ActivationToken> {
        self.world
            .character_mut(self.player)
            .map(|player| player.activate_abilities_with_tags(tags))
            .unwrap_or_default()
    }

    /// Changes the player level, regranting level-bound abilities.
    pub fn set_player_level(&mut self, level: u32) -> bool {
        let now = self.world.now();
        let Some(player) = self.world.character_mut(self.player) else {
            return false;
        };
        player.set_character_level(level, Some(&self.inventory), now)
    }

    /// Advances world time for every character.
    pub fn advance(&mut self, seconds: f32) -> Vec<(EntityId, TickOutcome)> {
        self.world.advance(seconds)
    }

    // ===== persistence =====

    /// Schedules a background write of the current save record.
    pub fn write_save(&self) -> bool {
        self.saves.write_save_game()
    }

    /// Replaces the save record with fresh defaults and reloads the
    /// inventory from it.
    pub fn reset_save(&mut self) {
        self.saves.reset_save_game();
        self.reload_inventory();
    }

    /// Rebuilds the inventory from the current save record.
    pub fn reload_inventory(&mut self) -> bool {
        let record = self.saves.current_record();
        let loaded = self
            .inventory
            .load_inventory(record.as_ref(), self.items.as_ref());
        self.sync_slotted_abilities();
        loaded
    }

    pub async fn wait_for_saves(&self) -> WriterStatus {
        self.saves.wait_idle().await
    }

    /// Reconciles slot abilities when the inventory reported slot changes.
    fn sync_slotted_abilities(&mut self) -> Option<ReconcileReport> {
        if !self.slots_dirty.swap(false, Ordering::AcqRel) {
            return None;
        }
        let player = self.world.character_mut(self.player)?;
        let report = player.refresh_slotted_abilities(&self.inventory);
        if !report.is_empty() {
            debug!(
                player = %self.player,
                revoked = report.revoked.len(),
                granted = report.granted.len(),
                "slot abilities refreshed"
            );
        }
        Some(report)
    }

    fn resolve(&self, id: &ItemId) -> Option<Arc<arpg_core::ItemDefinition>> {
        let item = self.items.definition(id);
        if item.is_none() {
            warn!(item = %id, "unknown item");
        }
        item
    }
}

impl std::fmt::Debug for PlayerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerSession")
            .field("player", &self.player)
            .field("inventory", &self.inventory)
            .field("saves", &self.saves)
            .finish_non_exhaustive()
    }
}

/// Builder for [`PlayerSession`].
pub struct PlayerSessionBuilder {
    game_config: GameConfig,
    save_config: SaveConfig,
    repository: Option<Arc<dyn SaveRepository>>,
    items: Option<Arc<dyn ItemRegistry>>,
    player: Option<Character>,
}

impl PlayerSessionBuilder {
    fn new() -> Self {
        Self {
            game_config: GameConfig::default(),
            save_config: SaveConfig::default(),
            repository: None,
            items: None,
            player: None,
        }
    }

    pub fn game_config(mut self, config: GameConfig) -> Self {
        self.game_config = config;
        self
    }

    pub fn save_config(mut self, config: SaveConfig) -> Self {
        self.save_config = config;
        self
    }

    /// Use `repository` instead of files under the configured save dir.
    pub fn repository(mut self, repository: Arc<dyn SaveRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    pub fn items(mut self, items: Arc<dyn ItemRegistry>) -> Self {
        self.items = Some(items);
        self
    }

    pub fn player(mut self, player: Character) -> Self {
        self.player = Some(player);
        self
    }

    /// Loads the save, restores the inventory and possesses the player.
    ///
    /// Must be called inside a tokio runtime; writes run on it.
    pub async fn build(self) -> Result<PlayerSession> {
        let items = self.items.ok_or(RuntimeError::MissingComponent("item registry"))?;
        let mut player = self.player.ok_or(RuntimeError::MissingComponent("player character"))?;

        let mut saves = match self.repository {
            Some(repository) => SaveGameService::new(&self.save_config, &self.game_config, repository)?,
            None => SaveGameService::with_file_repository(&self.save_config, &self.game_config)?,
        };
        let save_found = saves.load_or_create().await;

        let mut inventory = Inventory::new(&self.game_config);
        let slots_dirty = Arc::new(AtomicBool::new(false));
        let dirty = Arc::clone(&slots_dirty);
        inventory.subscribe(move |event| {
            if matches!(event, InventoryEvent::SlotChanged { .. } | InventoryEvent::Loaded) {
                dirty.store(true, Ordering::Release);
            }
        });
        inventory.set_save_sink(saves.handle());
        let record = saves.current_record();
        inventory.load_inventory(record.as_ref(), items.as_ref());

        let mut world = World::new();
        player.possess(Some(&inventory), world.now());
        slots_dirty.store(false, Ordering::Release);
        let player = world.spawn(player);

        let (slot, user_index) = saves.save_slot_info();
        info!(
            %player,
            slot,
            user_index,
            save_found,
            items = inventory.items(None).len(),
            "player session started"
        );

        Ok(PlayerSession {
            world,
            player,
            inventory,
            saves,
            items,
            slots_dirty,
            save_found,
        })
    }
}
