//! In-memory SaveRepository implementation for tests and local runs.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::repository::{RepositoryError, Result, SaveKey, SaveRepository};

/// In-memory implementation of SaveRepository.
#[derive(Debug, Default)]
pub struct InMemorySaveRepository {
    saves: RwLock<HashMap<SaveKey, Vec<u8>>>,
}

impl InMemorySaveRepository {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with one save already stored.
    pub fn with_save(key: SaveKey, bytes: Vec<u8>) -> Self {
        let mut saves = HashMap::new();
        saves.insert(key, bytes);
        Self {
            saves: RwLock::new(saves),
        }
    }
}

impl SaveRepository for InMemorySaveRepository {
    fn save(&self, key: &SaveKey, bytes: &[u8]) -> Result<()> {
        let mut saves = self
            .saves
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        saves.insert(key.clone(), bytes.to_vec());
        Ok(())
    }

    fn load(&self, key: &SaveKey) -> Result<Option<Vec<u8>>> {
        let saves = self
            .saves
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(saves.get(key).cloned())
    }

    fn exists(&self, key: &SaveKey) -> bool {
        self.saves
            .read()
            .map(|saves| saves.contains_key(key))
            .unwrap_or(false)
    }

    fn delete(&self, key: &SaveKey) -> Result<()> {
        let mut saves = self
            .saves
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        saves.remove(key);
        Ok(())
    }

    fn list_keys(&self) -> Result<Vec<SaveKey>> {
        let saves = self
            .saves
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let mut keys: Vec<SaveKey> = saves.keys().cloned().collect();
        keys.sort_unstable();
        Ok(keys)
    }
}
