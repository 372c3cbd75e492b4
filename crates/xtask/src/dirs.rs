//! Where the xtask commands find logs and saves.

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};

/// Name of the log file inside each session directory.
pub const LOG_FILE: &str = "simulate.log";

/// `<platform cache dir>/logs`, or `/tmp/arpg/logs` when there is no home.
pub fn log_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "arpg")
        .map_or_else(|| PathBuf::from("/tmp/arpg"), |dirs| dirs.cache_dir().to_path_buf())
        .join("logs")
}

/// Save directory as the runtime resolves it (`ARPG_SAVE_DIR` first).
pub fn save_dir() -> PathBuf {
    arpg_runtime::SaveConfig::from_env().save_dir
}

/// Simulation sessions under `log_dir`, newest first.
pub fn list_sessions(log_dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    if !log_dir.exists() {
        return Ok(Vec::new());
    }

    let mut sessions = Vec::new();
    for entry in std::fs::read_dir(log_dir)
        .with_context(|| format!("Failed to read log directory: {}", log_dir.display()))?
    {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let modified = entry.metadata()?.modified()?;
        let name = entry.file_name().to_string_lossy().into_owned();
        sessions.push((modified, name, entry.path()));
    }
    sessions.sort_by(|a, b| b.0.cmp(&a.0));

    Ok(sessions.into_iter().map(|(_, name, path)| (name, path)).collect())
}

pub fn find_session_log(log_dir: &Path, session_id: &str) -> Result<PathBuf> {
    session_log(&log_dir.join(session_id))
}

/// Log file of the most recently modified session.
pub fn find_latest_log(log_dir: &Path) -> Result<(String, PathBuf)> {
    let Some((session_id, path)) = list_sessions(log_dir)?.into_iter().next() else {
        bail!("No sessions found in {}", log_dir.display());
    };
    Ok((session_id, session_log(&path)?))
}

fn session_log(session_dir: &Path) -> Result<PathBuf> {
    let path = session_dir.join(LOG_FILE);
    if !path.exists() {
        bail!("Log file not found: {}", path.display());
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_named_session_logs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let session = dir.path().join("session_1");
        std::fs::create_dir(&session).expect("session dir");
        std::fs::write(session.join(LOG_FILE), "line\n").expect("log");
        std::fs::create_dir(dir.path().join("empty")).expect("empty dir");

        assert_eq!(list_sessions(dir.path()).expect("list").len(), 2);
        assert_eq!(
            find_session_log(dir.path(), "session_1").expect("named"),
            session.join(LOG_FILE)
        );
        assert!(find_session_log(dir.path(), "empty").is_err());
        assert!(list_sessions(&dir.path().join("missing")).expect("missing").is_empty());
    }

    #[test]
    fn latest_log_requires_a_session() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(find_latest_log(dir.path()).is_err());
    }
}
