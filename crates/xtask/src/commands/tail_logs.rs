//! Tail simulation logs command
//!
//! Follows `simulate` logs in real-time, similar to `tail -f`.
//! Picks the latest session unless one is named.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Duration;

use crate::dirs;

/// Monitor simulation logs in real-time
#[derive(Parser, Debug)]
pub struct TailLogs {
    /// Session ID to monitor (defaults to latest)
    pub session: Option<String>,

    /// Number of lines to show from history before following
    #[arg(short = 'n', long, default_value = "10")]
    pub lines: usize,

    /// Poll interval in milliseconds
    #[arg(long, default_value = "100")]
    pub poll_interval: u64,

    /// Print the history and exit instead of following
    #[arg(long)]
    pub no_follow: bool,

    /// List recorded sessions and exit
    #[arg(short, long, conflicts_with = "session")]
    pub list: bool,
}

impl TailLogs {
    pub fn execute(self) -> Result<()> {
        let log_dir = dirs::log_dir();

        if !log_dir.exists() {
            eprintln!("{}", style("✗ Log directory not found").red().bold());
            eprintln!("  Path: {}", style(log_dir.display()).dim());
            eprintln!();
            eprintln!("  Run a simulation first to generate logs:");
            eprintln!("    {}", style("cargo xtask simulate").cyan());
            anyhow::bail!("Log directory does not exist");
        }

        if self.list {
            for (session_id, path) in dirs::list_sessions(&log_dir)? {
                println!(
                    "  {} {}  {}",
                    style("→").cyan(),
                    style(session_id).bold(),
                    style(path.display()).dim()
                );
            }
            return Ok(());
        }

        let (session_id, log_path) = match self.session {
            Some(ref session) => (session.clone(), dirs::find_session_log(&log_dir, session)?),
            None => dirs::find_latest_log(&log_dir).context("Failed to find latest log file")?,
        };

        println!("{}", style("📝 Monitoring ARPG Logs").green().bold());
        println!("  Session:  {}", style(&session_id).cyan());
        println!("  Log file: {}", style(log_path.display()).dim());
        println!();

        self.tail_file(&log_path)
    }

    /// Prints the last `lines` lines, then keeps polling for appended ones.
    fn tail_file(&self, path: &Path) -> Result<()> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open log file: {}", path.display()))?;
        let mut reader = BufReader::new(file);

        let mut history = VecDeque::with_capacity(self.lines);
        let mut line = String::new();
        while reader.read_line(&mut line)? > 0 {
            if history.len() == self.lines {
                history.pop_front();
            }
            if self.lines > 0 {
                history.push_back(std::mem::take(&mut line));
            }
            line.clear();
        }
        for entry in history {
            print!("{}", entry);
        }

        if self.no_follow {
            return Ok(());
        }

        let poll_interval = Duration::from_millis(self.poll_interval);
        loop {
            line.clear();
            match reader.read_line(&mut line) {
                Ok(0) => std::thread::sleep(poll_interval),
                Ok(_) => print!("{}", line),
                Err(e) => {
                    eprintln!("{}", style(format!("Error reading log file: {}", e)).red());
                    anyhow::bail!("Failed to read log file");
                }
            }
        }
    }
}
