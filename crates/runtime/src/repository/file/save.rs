//! File-based SaveRepository implementation.

use std::fs;
use std::path::{Path, PathBuf};

use crate::repository::{RepositoryError, Result, SaveKey, SaveRepository};

const EXTENSION: &str = "sav";

/// Stores each save as `{slot}_{user_index}.sav` under one directory.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// crash mid-write leaves the previous save intact.
#[derive(Debug, Clone)]
pub struct FileSaveRepository {
    base_dir: PathBuf,
}

impl FileSaveRepository {
    /// Create a repository rooted at `base_dir`, creating it if needed.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir).map_err(RepositoryError::Io)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path of the file backing `key`.
    pub fn save_path(&self, key: &SaveKey) -> PathBuf {
        self.base_dir
            .join(format!("{}_{}.{EXTENSION}", key.slot, key.user_index))
    }

    fn checked_path(&self, key: &SaveKey) -> Result<PathBuf> {
        if !key.is_valid() {
            return Err(RepositoryError::InvalidSlot(key.slot.clone()));
        }
        Ok(self.save_path(key))
    }
}

impl SaveRepository for FileSaveRepository {
    fn save(&self, key: &SaveKey, bytes: &[u8]) -> Result<()> {
        let path = self.checked_path(key)?;
        let temp_path = path.with_extension("sav.tmp");

        fs::write(&temp_path, bytes).map_err(RepositoryError::Io)?;

        // Atomic rename
        fs::rename(&temp_path, &path).map_err(RepositoryError::Io)?;

        tracing::debug!("Saved {} ({} bytes) to {}", key, bytes.len(), path.display());

        Ok(())
    }

    fn load(&self, key: &SaveKey) -> Result<Option<Vec<u8>>> {
        let path = self.checked_path(key)?;

        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path).map_err(RepositoryError::Io)?;

        tracing::debug!("Loaded {} from {}", key, path.display());

        Ok(Some(bytes))
    }

    fn exists(&self, key: &SaveKey) -> bool {
        key.is_valid() && self.save_path(key).exists()
    }

    fn delete(&self, key: &SaveKey) -> Result<()> {
        let path = self.checked_path(key)?;

        if path.exists() {
            fs::remove_file(&path).map_err(RepositoryError::Io)?;
            tracing::debug!("Deleted save {}", key);
        }

        Ok(())
    }

    fn list_keys(&self) -> Result<Vec<SaveKey>> {
        let mut keys = Vec::new();

        let entries = fs::read_dir(&self.base_dir).map_err(RepositoryError::Io)?;

        for entry in entries {
            let entry = entry.map_err(RepositoryError::Io)?;
            let path = entry.path();

            if path.extension().and_then(|s| s.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str())
                && let Some((slot, index)) = stem.rsplit_once('_')
                && let Ok(user_index) = index.parse::<u32>()
            {
                keys.push(SaveKey::new(slot, user_index));
            }
        }

        keys.sort_unstable();
        Ok(keys)
    }
}
