//! Persistence and session orchestration for the action RPG core.
//!
//! This crate owns everything in the gameplay layer that touches I/O or
//! schedules work: save repositories, the single-flight background writer,
//! the save service that mirrors inventory into a versioned save record, and
//! [`PlayerSession`], which wires a player's character, inventory and save
//! together.
//!
//! Modules are organized by responsibility:
//! - [`save`] hosts the save service and the inventory save sink
//! - [`session`] wires world, inventory and saves for one player
//! - [`repository`] provides durable storage for encoded saves
//! - [`config`] loads save settings from the environment
//! - `workers` keeps the background writer internal to the crate
pub mod config;
pub mod error;
pub mod repository;
pub mod save;
pub mod session;

mod workers;

pub use config::{DEFAULT_SAVE_SLOT, SaveConfig, default_save_dir};
pub use error::{PersistenceError, Result, RuntimeError};
pub use repository::{
    FileSaveRepository, InMemorySaveRepository, RepositoryError, SaveKey, SaveRepository,
};
pub use save::{SaveEvent, SaveGameService, SaveHandle};
pub use session::{PlayerSession, PlayerSessionBuilder};
pub use workers::{SaveWriter, WriteRequest, WriterStatus};
