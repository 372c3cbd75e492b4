//! Clean save data and logs command
//!
//! Removes the workspace's persistent data:
//! - Simulation logs (cache directory)
//! - Save files (save directory, or a single slot)
//!
//! Always prompts for confirmation before deletion.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::io::{self, Write};
use std::path::PathBuf;

use arpg_runtime::{FileSaveRepository, SaveKey};

use crate::dirs;

/// Clean save data and logs
#[derive(Parser, Debug)]
pub struct Clean {
    /// Clean only logs (cache directory)
    #[arg(long)]
    pub logs: bool,

    /// Clean only save files
    #[arg(long)]
    pub saves: bool,

    /// Skip confirmation prompt (dangerous!)
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Delete a single save slot instead of the whole directory (only works with --saves)
    #[arg(long)]
    pub slot: Option<String>,

    /// User index of the slot given with --slot
    #[arg(long, default_value = "0")]
    pub user_index: u32,

    /// Custom save directory (defaults to ARPG_SAVE_DIR or the platform location)
    #[arg(long, value_name = "DIR")]
    pub save_dir: Option<PathBuf>,
}

enum Target {
    Dir(PathBuf),
    File(PathBuf),
}

impl Clean {
    pub fn execute(self) -> Result<()> {
        // If no flags specified, clean both
        let clean_logs = self.logs || !self.saves;
        let clean_saves = self.saves || !self.logs;

        if self.slot.is_some() && !self.saves {
            anyhow::bail!("--slot can only be used with --saves");
        }

        let mut targets = Vec::new();

        if clean_logs {
            let log_dir = dirs::log_dir();
            if log_dir.exists() {
                targets.push(("All logs".to_string(), Target::Dir(log_dir)));
            }
        }

        if clean_saves {
            let save_dir = self.save_dir.clone().unwrap_or_else(dirs::save_dir);
            if let Some(ref slot) = self.slot {
                let key = SaveKey::new(slot.clone(), self.user_index);
                if !key.is_valid() {
                    anyhow::bail!("Invalid save slot name: {}", slot);
                }
                let path = FileSaveRepository::new(&save_dir)
                    .context("Failed to open save directory")?
                    .save_path(&key);
                if path.exists() {
                    targets.push((format!("Save slot ({})", key), Target::File(path)));
                } else {
                    eprintln!(
                        "{} Save slot not found: {}",
                        style("✗").red().bold(),
                        style(&key).cyan()
                    );
                    anyhow::bail!("Save file does not exist");
                }
            } else if save_dir.exists() {
                targets.push(("All saves".to_string(), Target::Dir(save_dir)));
            }
        }

        if targets.is_empty() {
            println!(
                "{}",
                style("Nothing to clean - directories don't exist yet").dim()
            );
            return Ok(());
        }

        println!("{}", style("🧹 Clean ARPG Data").yellow().bold());
        println!();
        println!("The following will be deleted:");
        for (label, target) in &targets {
            let path = match target {
                Target::Dir(path) | Target::File(path) => path,
            };
            println!("  {} {}", style("→").cyan(), style(label).bold());
            println!("    {}", style(path.display()).dim());
        }
        println!();

        if !self.yes && !self.confirm()? {
            println!("{}", style("Cancelled").dim());
            return Ok(());
        }

        for (label, target) in targets {
            print!("Deleting {}... ", label);
            io::stdout().flush()?;

            match target {
                Target::Dir(path) => std::fs::remove_dir_all(&path)
                    .with_context(|| format!("Failed to delete: {}", path.display()))?,
                Target::File(path) => std::fs::remove_file(&path)
                    .with_context(|| format!("Failed to delete: {}", path.display()))?,
            }

            println!("{}", style("✓").green());
        }

        println!();
        println!("{}", style("✓ Cleanup complete!").green().bold());

        Ok(())
    }

    /// Prompt user for confirmation
    fn confirm(&self) -> Result<bool> {
        print!("{} ", style("Proceed? [y/N]").yellow().bold());
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        let input = input.trim().to_lowercase();
        Ok(input == "y" || input == "yes")
    }
}
