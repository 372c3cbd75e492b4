//! Read and inspect save files
//!
//! Decodes `{slot}_{user_index}.sav` files (migrating older records) and
//! displays their contents.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::path::PathBuf;

use arpg_core::save::{DecodedSave, decode_save};
use arpg_runtime::{DEFAULT_SAVE_SLOT, FileSaveRepository, SaveKey, SaveRepository};

use crate::dirs;

/// Read and inspect save files
#[derive(Parser)]
pub struct ReadSave {
    /// Save slot name
    #[arg(value_name = "SLOT", default_value = DEFAULT_SAVE_SLOT)]
    slot: String,

    /// User index of the slot
    #[arg(short, long, default_value = "0")]
    user_index: u32,

    /// Read this file directly instead of looking up a slot
    #[arg(long, value_name = "FILE", conflicts_with = "list")]
    file: Option<PathBuf>,

    /// Custom save directory (defaults to ARPG_SAVE_DIR or the platform location)
    #[arg(short, long, value_name = "DIR")]
    save_dir: Option<PathBuf>,

    /// List every save in the directory instead of reading one
    #[arg(short, long)]
    list: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// Summary view (inventory, slots, timestamps)
    Summary,
    /// Full JSON output
    Json,
    /// Pretty-printed debug format
    Debug,
}

impl ReadSave {
    pub fn execute(self) -> Result<()> {
        let save_dir = self.save_dir.clone().unwrap_or_else(dirs::save_dir);
        let repository = FileSaveRepository::new(&save_dir)
            .with_context(|| format!("Failed to open save directory: {}", save_dir.display()))?;

        if self.list {
            return list_saves(&repository);
        }

        let path = match self.file {
            Some(ref file) => file.clone(),
            None => {
                let key = SaveKey::new(self.slot.clone(), self.user_index);
                if !key.is_valid() {
                    anyhow::bail!("Invalid save slot name: {}", self.slot);
                }
                repository.save_path(&key)
            }
        };

        if !path.exists() {
            anyhow::bail!(
                "Save file not found: {}\n\nHint: List available saves with `cargo xtask read-save --list`",
                path.display()
            );
        }

        let bytes = std::fs::read(&path)
            .with_context(|| format!("Failed to read save file: {}", path.display()))?;
        let decoded = decode_save(&bytes)
            .with_context(|| format!("Failed to decode save file: {}", path.display()))?;

        println!("{} {}", style("Save File:").bold().cyan(), path.display());
        println!(
            "{} {}",
            style("File Size:").bold().cyan(),
            format_bytes(bytes.len())
        );
        println!(
            "{} {}",
            style("Saved At:").bold().cyan(),
            format_timestamp(decoded.saved_at)
        );
        println!();

        match self.format {
            OutputFormat::Summary => print_summary(&decoded),
            OutputFormat::Json => print_json(&decoded)?,
            OutputFormat::Debug => println!("{:#?}", decoded),
        }

        Ok(())
    }
}

fn list_saves(repository: &FileSaveRepository) -> Result<()> {
    let keys = repository.list_keys().context("Failed to list saves")?;
    println!(
        "{} {}",
        style("Save Directory:").bold().cyan(),
        repository.base_dir().display()
    );
    if keys.is_empty() {
        println!("{}", style("No saves found").dim());
        return Ok(());
    }
    for key in keys {
        println!(
            "  {} {} (user {})",
            style("→").cyan(),
            style(&key.slot).bold(),
            key.user_index
        );
    }
    Ok(())
}

fn print_summary(decoded: &DecodedSave) {
    let record = &decoded.record;
    println!("{}", style("=== Save Summary ===").bold().green());
    println!();

    println!("{}", style("Format:").bold().yellow());
    println!("  Stored Version: {}", decoded.stored_version);
    println!("  Current Version: {}", record.version);
    println!("  Checksum: {}", hex::encode(decoded.checksum));
    if !record.user_id.is_empty() {
        println!("  User: {}", record.user_id);
    }
    println!();

    println!("{}", style("Inventory:").bold().yellow());
    if record.inventory.is_empty() {
        println!("  (empty)");
    }
    for (item, data) in &record.inventory {
        println!("  {} x{} (level {})", item, data.count, data.level);
    }
    println!();

    println!("{}", style("Slots:").bold().yellow());
    if record.slots.is_empty() {
        println!("  (none)");
    }
    for (slot, item) in &record.slots {
        match item {
            Some(item) => println!("  {} -> {}", slot, item),
            None => println!("  {} -> {}", slot, style("empty").dim()),
        }
    }
    println!();
}

/// Item ids and slots are not string keys, so the JSON view flattens them.
fn print_json(decoded: &DecodedSave) -> Result<()> {
    let record = &decoded.record;
    let inventory: serde_json::Map<String, serde_json::Value> = record
        .inventory
        .iter()
        .map(|(item, data)| {
            (
                item.to_string(),
                serde_json::json!({ "count": data.count, "level": data.level }),
            )
        })
        .collect();
    let slots: serde_json::Map<String, serde_json::Value> = record
        .slots
        .iter()
        .map(|(slot, item)| {
            (
                slot.to_string(),
                item.as_ref()
                    .map_or(serde_json::Value::Null, |item| item.to_string().into()),
            )
        })
        .collect();

    let view = serde_json::json!({
        "saved_at": decoded.saved_at,
        "checksum": hex::encode(decoded.checksum),
        "stored_version": decoded.stored_version.to_string(),
        "version": record.version.to_string(),
        "user_id": record.user_id,
        "inventory": inventory,
        "slots": slots,
    });
    let json = serde_json::to_string_pretty(&view).context("Failed to serialize save to JSON")?;
    println!("{}", json);
    Ok(())
}

fn format_timestamp(saved_at: i64) -> String {
    chrono::DateTime::from_timestamp(saved_at, 0)
        .map(|time| time.to_rfc3339())
        .unwrap_or_else(|| format!("{} (invalid)", saved_at))
}

fn format_bytes(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
