//! Save configuration and its environment loader.

use std::env;
use std::path::PathBuf;

use directories::ProjectDirs;

pub const DEFAULT_SAVE_SLOT: &str = "SaveGame";

/// Where and whether saves are written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveConfig {
    /// Slot name the session reads and writes.
    pub slot: String,
    /// Local user index. Single-user hosts leave it at 0.
    pub user_index: u32,
    /// When off, loads always produce fresh defaults and writes are refused.
    pub saving_enabled: bool,
    pub save_dir: PathBuf,
}

impl Default for SaveConfig {
    fn default() -> Self {
        Self {
            slot: DEFAULT_SAVE_SLOT.to_owned(),
            user_index: 0,
            saving_enabled: true,
            save_dir: default_save_dir(),
        }
    }
}

impl SaveConfig {
    pub fn new(save_dir: impl Into<PathBuf>) -> Self {
        Self {
            save_dir: save_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_slot(mut self, slot: impl Into<String>, user_index: u32) -> Self {
        self.slot = slot.into();
        self.user_index = user_index;
        self
    }

    pub fn with_saving_enabled(mut self, enabled: bool) -> Self {
        self.saving_enabled = enabled;
        self
    }

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `ARPG_SAVE_SLOT` - Slot name (default: "SaveGame")
    /// - `ARPG_SAVE_USER_INDEX` - User index (default: 0)
    /// - `ARPG_SAVING_ENABLED` - Enable saving (default: true)
    /// - `ARPG_SAVE_DIR` - Save directory (default: platform data dir)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(slot) = env::var("ARPG_SAVE_SLOT")
            && !slot.trim().is_empty()
        {
            config.slot = slot.trim().to_owned();
        }
        if let Some(index) = read_env::<u32>("ARPG_SAVE_USER_INDEX") {
            config.user_index = index;
        }
        if let Some(enabled) = read_env_bool("ARPG_SAVING_ENABLED") {
            config.saving_enabled = enabled;
        }
        if let Some(dir) = read_env::<PathBuf>("ARPG_SAVE_DIR") {
            config.save_dir = dir;
        }

        config
    }
}

/// Platform data directory for saves, falling back to `./saves`.
pub fn default_save_dir() -> PathBuf {
    ProjectDirs::from("", "", "arpg")
        .map(|dirs| dirs.data_dir().join("saves"))
        .unwrap_or_else(|| PathBuf::from("saves"))
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

fn read_env_bool(key: &str) -> Option<bool> {
    match env::var(key).ok()?.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_the_standard_slot() {
        let config = SaveConfig::new("/tmp/saves");
        assert_eq!(config.slot, "SaveGame");
        assert_eq!(config.user_index, 0);
        assert!(config.saving_enabled);
        assert_eq!(config.save_dir, PathBuf::from("/tmp/saves"));
    }

    #[test]
    fn builders_override_fields() {
        let config = SaveConfig::new("saves")
            .with_slot("Alt", 2)
            .with_saving_enabled(false);
        assert_eq!(config.slot, "Alt");
        assert_eq!(config.user_index, 2);
        assert!(!config.saving_enabled);
    }
}
