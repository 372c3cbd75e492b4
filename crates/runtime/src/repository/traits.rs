//! Repository contract for durable save storage.

use std::fmt;

use super::Result;

/// Identifies one save: a slot name plus the local user index.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SaveKey {
    pub slot: String,
    pub user_index: u32,
}

impl SaveKey {
    pub fn new(slot: impl Into<String>, user_index: u32) -> Self {
        Self {
            slot: slot.into(),
            user_index,
        }
    }

    /// A slot name is usable when it is non-empty and made only of ASCII
    /// letters, digits, `-` and `_`.
    pub fn is_valid(&self) -> bool {
        !self.slot.is_empty()
            && self
                .slot
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }
}

impl fmt::Display for SaveKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.slot, self.user_index)
    }
}

/// Key-value store for encoded save files.
///
/// Implementations only move bytes; encoding, checksums and migration are
/// handled by the save codec. Calls block, so async callers run them on the
/// blocking pool.
pub trait SaveRepository: Send + Sync {
    /// Store `bytes` under `key`, replacing any previous save.
    fn save(&self, key: &SaveKey, bytes: &[u8]) -> Result<()>;

    /// Load the bytes stored under `key`.
    fn load(&self, key: &SaveKey) -> Result<Option<Vec<u8>>>;

    /// Check if a save exists
    fn exists(&self, key: &SaveKey) -> bool;

    /// Delete a save. Deleting a missing save is not an error.
    fn delete(&self, key: &SaveKey) -> Result<()>;

    /// List all stored saves
    fn list_keys(&self) -> Result<Vec<SaveKey>> {
        Ok(vec![])
    }
}
