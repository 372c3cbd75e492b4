//! Repository layer for save files.
//!
//! Repositories store opaque encoded saves keyed by slot name and user index.
//! Static content (items, abilities, effects) is loaded by `arpg-content`, not
//! by repositories.

mod error;
mod file;
mod memory;
mod traits;

pub use error::{RepositoryError, Result};
pub use file::FileSaveRepository;
pub use memory::InMemorySaveRepository;
pub use traits::{SaveKey, SaveRepository};
