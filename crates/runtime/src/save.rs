//! Save game service: owns the in-memory save record and mirrors it to disk.
//!
//! The record is a write-behind copy of the player's inventory. Loads are
//! additive against the configured default inventory, writes are encoded on
//! the caller's thread and handed to the [`SaveWriter`].

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use arpg_core::GameError;
use arpg_core::save::{DecodedSave, decode_save, encode_save};
use arpg_core::{
    EventListeners, GameConfig, InventoryRecord, InventorySnapshot, ItemId, ListenerId, SaveRecord,
    SaveSink,
};

use crate::config::SaveConfig;
use crate::error::{PersistenceError, Result, RuntimeError};
use crate::repository::{FileSaveRepository, SaveKey, SaveRepository};
use crate::workers::{SaveWriter, WriteRequest, WriterStatus};

/// Notifications raised by [`SaveGameService`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaveEvent {
    /// A record became current. `found` is false for freshly created records.
    Loaded { record: SaveRecord, found: bool },
}

#[derive(Debug)]
struct SaveState {
    key: SaveKey,
    saving_enabled: bool,
    record: Option<SaveRecord>,
    defaults: BTreeMap<ItemId, InventoryRecord>,
}

fn lock(state: &Mutex<SaveState>) -> MutexGuard<'_, SaveState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Persistence adapter between the gameplay layer and a [`SaveRepository`].
pub struct SaveGameService {
    state: Arc<Mutex<SaveState>>,
    writer: SaveWriter,
    listeners: EventListeners<SaveEvent>,
}

impl SaveGameService {
    /// Creates a service writing through `repository` on the current tokio
    /// runtime.
    pub fn new(
        config: &SaveConfig,
        game_config: &GameConfig,
        repository: Arc<dyn SaveRepository>,
    ) -> Result<Self> {
        let writer = SaveWriter::new(repository)?;
        Ok(Self {
            state: Arc::new(Mutex::new(SaveState {
                key: SaveKey::new(config.slot.clone(), config.user_index),
                saving_enabled: config.saving_enabled,
                record: None,
                defaults: game_config.default_inventory_map(),
            })),
            writer,
            listeners: EventListeners::new(),
        })
    }

    /// Creates a service backed by files under `config.save_dir`.
    pub fn with_file_repository(config: &SaveConfig, game_config: &GameConfig) -> Result<Self> {
        let repository = FileSaveRepository::new(&config.save_dir)?;
        Self::new(config, game_config, Arc::new(repository))
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&SaveEvent) + Send + 'static) -> ListenerId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Slot name and user index this service reads and writes.
    pub fn save_slot_info(&self) -> (String, u32) {
        let state = lock(&self.state);
        (state.key.slot.clone(), state.key.user_index)
    }

    pub fn saving_enabled(&self) -> bool {
        lock(&self.state).saving_enabled
    }

    pub fn set_saving_enabled(&self, enabled: bool) {
        lock(&self.state).saving_enabled = enabled;
    }

    pub fn current_record(&self) -> Option<SaveRecord> {
        lock(&self.state).record.clone()
    }

    /// A sink that mirrors inventory snapshots into this service's record.
    pub fn handle(&self) -> SaveHandle {
        SaveHandle {
            state: Arc::clone(&self.state),
            writer: self.writer.clone(),
        }
    }

    pub fn writer_status(&self) -> WriterStatus {
        self.writer.status()
    }

    /// Resolves once every requested write has reached the repository.
    pub async fn wait_idle(&self) -> WriterStatus {
        self.writer.wait_idle().await
    }

    /// Loads the configured save, or creates a default one.
    ///
    /// Read and decode failures are logged and treated as "no save". Returns
    /// whether an existing save was found.
    pub async fn load_or_create(&mut self) -> bool {
        let (key, enabled) = {
            let state = lock(&self.state);
            (state.key.clone(), state.saving_enabled)
        };

        let loaded = if enabled {
            match self.read_save(key.clone()).await {
                Ok(decoded) => decoded.map(|decoded| decoded.record),
                Err(err) => {
                    error!(save = %key, error = %err, "failed to read save; using defaults");
                    None
                }
            }
        } else {
            debug!(save = %key, "saving disabled; skipping load");
            None
        };

        self.handle_save_loaded(loaded)
    }

    /// Makes `loaded` the current record, or a fresh default record when it
    /// is absent or saving is disabled.
    ///
    /// Existing records only gain missing default items. Fresh records hold
    /// exactly the defaults. Raises [`SaveEvent::Loaded`] either way.
    pub fn handle_save_loaded(&mut self, loaded: Option<SaveRecord>) -> bool {
        let (record, found) = {
            let mut state = lock(&self.state);
            let loaded = loaded.filter(|_| state.saving_enabled);
            let found = loaded.is_some();
            let mut record = loaded.unwrap_or_default();
            record.add_default_inventory(&state.defaults, !found);
            state.record = Some(record.clone());
            (record, found)
        };

        info!(
            found,
            items = record.inventory.len(),
            version = %record.version,
            "save record ready"
        );
        self.listeners.emit(&SaveEvent::Loaded { record, found });
        found
    }

    /// Replaces the current record with fresh defaults without touching the
    /// stored save. The next write overwrites it.
    pub fn reset_save_game(&mut self) {
        self.handle_save_loaded(None);
    }

    /// Encodes the current record and schedules a background write.
    pub fn write_save_game(&self) -> bool {
        self.handle().write()
    }

    /// Deletes the stored save. The in-memory record is left alone.
    pub async fn delete_save(&self) -> Result<()> {
        let key = lock(&self.state).key.clone();
        let repository = Arc::clone(self.writer.repository());
        tokio::task::spawn_blocking(move || repository.delete(&key))
            .await
            .map_err(RuntimeError::WorkerJoin)??;
        Ok(())
    }

    async fn read_save(&self, key: SaveKey) -> Result<Option<DecodedSave>> {
        let repository = Arc::clone(self.writer.repository());
        let lookup = key.clone();
        let bytes = tokio::task::spawn_blocking(move || repository.load(&lookup))
            .await
            .map_err(RuntimeError::WorkerJoin)??;

        let Some(bytes) = bytes else {
            debug!(save = %key, "no save found");
            return Ok(None);
        };

        let decoded = decode_save(&bytes).map_err(|source| {
            warn!(
                save = %key,
                code = source.error_code(),
                severity = source.severity().as_str(),
                "save rejected"
            );
            PersistenceError::Decode {
                key: key.to_string(),
                source,
            }
        })?;
        info!(
            save = %key,
            stored_version = %decoded.stored_version,
            saved_at = %format_timestamp(decoded.saved_at),
            checksum = %hex::encode(&decoded.checksum[..4]),
            "save loaded"
        );
        Ok(Some(decoded))
    }
}

impl std::fmt::Debug for SaveGameService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveGameService")
            .field("state", &*lock(&self.state))
            .field("writer", &self.writer)
            .finish_non_exhaustive()
    }
}

/// Cloneable writer into a [`SaveGameService`]'s record.
///
/// Installed as the inventory's [`SaveSink`]: each snapshot replaces the
/// record's inventory and slots and schedules a write.
#[derive(Clone)]
pub struct SaveHandle {
    state: Arc<Mutex<SaveState>>,
    writer: SaveWriter,
}

impl SaveHandle {
    /// Encodes the current record and hands it to the writer.
    ///
    /// Returns `false` when saving is disabled, no record is loaded, or
    /// encoding fails. A request queued behind a running write counts as
    /// accepted.
    pub fn write(&self) -> bool {
        match self.encode_current() {
            Ok((key, bytes)) => {
                if self.writer.request(key.clone(), bytes) == WriteRequest::Queued {
                    debug!(save = %key, "save coalesced into pending write");
                }
                true
            }
            Err(PersistenceError::SavingDisabled) => {
                debug!("saving disabled; write skipped");
                false
            }
            Err(err) => {
                warn!(error = %err, "save write rejected");
                false
            }
        }
    }

    fn encode_current(&self) -> std::result::Result<(SaveKey, Vec<u8>), PersistenceError> {
        let state = lock(&self.state);
        if !state.saving_enabled {
            return Err(PersistenceError::SavingDisabled);
        }
        let record = state.record.as_ref().ok_or(PersistenceError::NoRecord)?;
        let bytes = encode_save(record, Utc::now().timestamp()).map_err(PersistenceError::Encode)?;
        Ok((state.key.clone(), bytes))
    }
}

impl SaveSink for SaveHandle {
    fn persist(&mut self, snapshot: InventorySnapshot) -> bool {
        {
            let mut state = lock(&self.state);
            let Some(record) = state.record.as_mut() else {
                warn!("inventory saved before any save record was loaded");
                return false;
            };
            record.apply_inventory_snapshot(snapshot);
        }
        self.write()
    }
}

impl std::fmt::Debug for SaveHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveHandle").finish_non_exhaustive()
    }
}

fn format_timestamp(seconds: i64) -> String {
    DateTime::<Utc>::from_timestamp(seconds, 0)
        .map(|at| at.to_rfc3339())
        .unwrap_or_else(|| seconds.to_string())
}
