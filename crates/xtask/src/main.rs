//! Development tasks for the ARPG workspace
//!
//! This binary provides development utilities using the cargo-xtask pattern.
//! Run with: `cargo xtask <command>`

mod commands;
mod dirs;

use anyhow::Result;
use clap::Parser;
use commands::{Clean, ReadSave, Simulate, TailLogs};

/// Development tasks for the ARPG workspace
#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development tools for the ARPG save and gameplay crates", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Decode and inspect a save file
    ReadSave(ReadSave),

    /// Play a short scripted session against the bundled content
    Simulate(Simulate),

    /// Monitor simulation logs in real-time
    TailLogs(TailLogs),

    /// Clean save data and logs
    Clean(Clean),
}

fn main() -> Result<()> {
    // Load .env file if it exists (for ARPG_SAVE_DIR and other env vars)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    match cli.command {
        Command::ReadSave(cmd) => cmd.execute(),
        Command::Simulate(cmd) => cmd.execute(),
        Command::TailLogs(cmd) => cmd.execute(),
        Command::Clean(cmd) => cmd.execute(),
    }
}
