//! Scripted play session against the bundled content
//!
//! Spawns the player and one enemy, swings the slotted weapon, casts the
//! slotted skill, drinks a potion, lets effects tick, and finally writes the
//! save through the background writer. Logs go to a per-run session
//! directory that `tail-logs` can follow.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use arpg_content::{ContentFactory, ContentLibrary};
use arpg_core::{
    EntityId, GameplayEventData, GameplayTag, HitResult, ItemId, ItemSlot, ItemType,
};
use arpg_runtime::{
    FileSaveRepository, InMemorySaveRepository, PlayerSession, SaveConfig, SaveRepository,
};

use crate::dirs;

const PLAYER: EntityId = EntityId(1);
const ENEMY: EntityId = EntityId(2);

const HIT_EVENT: &str = "Event.Montage.Hit";
const DRINK_EVENT: &str = "Event.Potion.Drink";

/// Play a short scripted session against the bundled content
#[derive(Parser, Debug)]
pub struct Simulate {
    /// Character template to fight
    #[arg(long, default_value = "Goblin")]
    enemy: String,

    /// Number of attack rounds
    #[arg(short, long, default_value = "3")]
    rounds: u32,

    /// Load content from this directory instead of the bundled data
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Save slot to load and write
    #[arg(long)]
    slot: Option<String>,

    /// Custom save directory (defaults to ARPG_SAVE_DIR or the platform location)
    #[arg(long, value_name = "DIR")]
    save_dir: Option<PathBuf>,

    /// Keep saves in memory instead of writing files
    #[arg(long)]
    in_memory: bool,

    /// Also log to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Simulate {
    pub fn execute(self) -> Result<()> {
        let _guard = setup_logging(self.verbose)?;

        let runtime = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
        runtime.block_on(self.run())
    }

    async fn run(self) -> Result<()> {
        let library = match self.data_dir {
            Some(ref dir) => ContentFactory::new(dir).load_library()?,
            None => ContentLibrary::bundled()?,
        };

        let mut save_config = SaveConfig::from_env();
        if let Some(ref dir) = self.save_dir {
            save_config.save_dir = dir.clone();
        }
        if let Some(ref slot) = self.slot {
            let user_index = save_config.user_index;
            save_config = save_config.with_slot(slot.clone(), user_index);
        }

        let repository: Arc<dyn SaveRepository> = if self.in_memory {
            Arc::new(InMemorySaveRepository::new())
        } else {
            Arc::new(
                FileSaveRepository::new(&save_config.save_dir).with_context(|| {
                    format!(
                        "Failed to open save directory: {}",
                        save_config.save_dir.display()
                    )
                })?,
            )
        };

        let player = library.spawn_character("Player", PLAYER)?;
        let mut session = PlayerSession::builder()
            .game_config(library.config().clone())
            .save_config(save_config)
            .repository(repository)
            .items(library.item_registry())
            .player(player)
            .build()
            .await?;
        session.fill_empty_slots();

        let (slot, user_index) = session.saves().save_slot_info();
        println!("{}", style("⚔ ARPG Simulation").green().bold());
        println!(
            "  Save:  {} (user {}) {}",
            style(&slot).cyan(),
            user_index,
            if session.save_found() {
                style("loaded").green()
            } else {
                style("new").yellow()
            }
        );

        let mut enemy = library.spawn_character(&self.enemy, ENEMY)?;
        enemy.possess(None, session.world().now());
        session.spawn(enemy);

        print_slots(&session);
        println!();

        let hit = GameplayTag::new(HIT_EVENT);
        let at_enemy = GameplayEventData::with_hit(HitResult::on_actor(ENEMY));
        for round in 1..=self.rounds {
            println!("{}", style(format!("Round {}", round)).bold().yellow());
            for slot in [
                ItemSlot::new(ItemType::Weapon, 0),
                ItemSlot::new(ItemType::Skill, 0),
            ] {
                match use_slot(&mut session, &slot, &hit, &at_enemy) {
                    Ok(applied) => println!("  {} {} ({} effects)", style("→").cyan(), slot, applied),
                    Err(reason) => println!("  {} {} {}", style("✗").red(), slot, style(reason).dim()),
                }
            }
            for (id, outcome) in session.advance(1.0) {
                tracing::debug!(%id, ?outcome, "effects ticked");
            }
            print_health(&session);
        }

        println!();
        println!("{}", style("Recovery").bold().yellow());
        let potion = ItemSlot::new(ItemType::Potion, 0);
        let drink = GameplayTag::new(DRINK_EVENT);
        match use_slot(&mut session, &potion, &drink, &GameplayEventData::default()) {
            Ok(_) => {
                let drunk = session
                    .inventory()
                    .slotted_item(&potion)
                    .map(|item| item.id.clone());
                if let Some(id) = drunk {
                    session.remove_item(&id, 1);
                }
                println!("  {} drank a potion", style("→").cyan());
            }
            Err(reason) => println!("  {} {}", style("✗").red(), style(reason).dim()),
        }
        print_health(&session);

        let defeated = session
            .world()
            .character(ENEMY)
            .is_some_and(|enemy| enemy.health() <= 0.0);
        if defeated {
            session.add_item(&ItemId::new(ItemType::Token, "Soul"), 1, 1);
            println!("  {} {} defeated, soul collected", style("✓").green(), self.enemy);
        }

        session.write_save();
        let status = session.wait_for_saves().await;
        println!();
        println!(
            "{} {} written, {} failed",
            style("Saves:").bold().cyan(),
            status.completed,
            status.failed
        );

        Ok(())
    }
}

/// Activates the ability in `slot`, commits it, and applies its container
/// for `event`. Returns the number of effects applied.
fn use_slot(
    session: &mut PlayerSession,
    slot: &ItemSlot,
    event: &GameplayTag,
    data: &GameplayEventData,
) -> Result<usize, String> {
    let token = session.activate_slot(slot).map_err(|e| e.to_string())?;
    let now = session.world().now();
    let player = session
        .player_mut()
        .ok_or_else(|| "player missing".to_string())?;
    if let Err(e) = player.commit_ability(token, now) {
        let _ = player.end_ability(token);
        return Err(e.to_string());
    }

    let applied = session
        .world_mut()
        .apply_effect_container(PLAYER, token, event, data, None);

    if let Some(player) = session.player_mut() {
        let _ = player.end_ability(token);
    }
    Ok(applied.len())
}

fn print_slots(session: &PlayerSession) {
    let Some(player) = session.player() else {
        return;
    };
    for (slot, handle) in player.slotted_abilities() {
        if let Some(spec) = player.abilities().spec(*handle) {
            println!(
                "  {} {} -> {} (level {})",
                style("•").dim(),
                slot,
                spec.definition.id,
                spec.level
            );
        }
    }
}

fn print_health(session: &PlayerSession) {
    for id in [PLAYER, ENEMY] {
        if let Some(character) = session.world().character(id) {
            println!(
                "    {} HP {:.0}/{:.0}  MP {:.0}/{:.0}",
                id,
                character.health(),
                character.max_health(),
                character.mana(),
                character.max_mana()
            );
        }
    }
}

/// Logs to a fresh session directory, and to stderr when `verbose`.
fn setup_logging(verbose: bool) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let session_id = format!("session_{}", chrono::Utc::now().timestamp());
    let session_log_dir = dirs::log_dir().join(&session_id);
    std::fs::create_dir_all(&session_log_dir).with_context(|| {
        format!(
            "Failed to create log directory: {}",
            session_log_dir.display()
        )
    })?;

    let file_appender = tracing_appender::rolling::never(&session_log_dir, dirs::LOG_FILE);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::DEBUG.into());

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(true);
    let stderr_layer = verbose.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    tracing::info!("Logging initialized: session={}", session_id);
    tracing::info!("Log file: {}/{}", session_log_dir.display(), dirs::LOG_FILE);

    Ok(guard)
}
