//! Error types surfaced by the runtime.
//!
//! Host-facing calls follow the gameplay convention of logging and returning
//! `bool` / `Option`; these types are what gets logged, and what builders and
//! tooling propagate with `?`.

use thiserror::Error;

use arpg_core::save::SaveCodecError;

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("no tokio runtime available for background saves")]
    NoAsyncRuntime,

    #[error("session requires a {0} before building")]
    MissingComponent(&'static str),

    #[error("save worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Failures while reading or writing a save.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("saving is disabled")]
    SavingDisabled,

    #[error("no save record is loaded")]
    NoRecord,

    #[error("save {key} could not be decoded: {source}")]
    Decode {
        key: String,
        #[source]
        source: SaveCodecError,
    },

    #[error("save could not be encoded: {0}")]
    Encode(#[source] SaveCodecError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
