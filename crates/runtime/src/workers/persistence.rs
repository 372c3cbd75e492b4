//! Single-flight writer for encoded saves.
//!
//! At most one physical write runs at a time. A request that arrives while a
//! write is in flight replaces the queued follow-up, so any burst of requests
//! collapses into the running write plus one more carrying the newest bytes.
//!
//! ```text
//! request ──► idle?  ──yes──► spawn write ──► done ──► pending? ──yes──► write again
//!               │                                          │
//!               no ──► pending = newest bytes              no ──► idle
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::error::{Result, RuntimeError};
use crate::repository::{SaveKey, SaveRepository};

/// Counters published after every state change of the writer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WriterStatus {
    pub in_flight: bool,
    pub completed: u64,
    pub failed: u64,
    /// Requests that were folded into a follow-up write.
    pub queued: u64,
}

/// What happened to a write request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteRequest {
    Started,
    Queued,
}

struct PendingWrite {
    key: SaveKey,
    bytes: Vec<u8>,
}

#[derive(Default)]
struct WriteState {
    in_flight: bool,
    pending: Option<PendingWrite>,
}

struct Shared {
    repository: Arc<dyn SaveRepository>,
    state: Mutex<WriteState>,
    status: watch::Sender<WriterStatus>,
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, WriteState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Cloneable handle to the background save writer.
#[derive(Clone)]
pub struct SaveWriter {
    shared: Arc<Shared>,
    runtime: Handle,
}

impl SaveWriter {
    /// Creates a writer on the current tokio runtime.
    pub fn new(repository: Arc<dyn SaveRepository>) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| RuntimeError::NoAsyncRuntime)?;
        Ok(Self::with_handle(repository, runtime))
    }

    pub fn with_handle(repository: Arc<dyn SaveRepository>, runtime: Handle) -> Self {
        let (status, _) = watch::channel(WriterStatus::default());
        Self {
            shared: Arc::new(Shared {
                repository,
                state: Mutex::new(WriteState::default()),
                status,
            }),
            runtime,
        }
    }

    pub fn repository(&self) -> &Arc<dyn SaveRepository> {
        &self.shared.repository
    }

    /// Writes `bytes` under `key` in the background.
    ///
    /// Never blocks on I/O. When a write is already running the request is
    /// queued as the single follow-up, replacing any older queued bytes.
    pub fn request(&self, key: SaveKey, bytes: Vec<u8>) -> WriteRequest {
        let write = PendingWrite { key, bytes };
        {
            let mut state = self.shared.lock_state();
            if state.in_flight {
                state.pending = Some(write);
                self.shared.status.send_modify(|status| status.queued += 1);
                debug!("save already in flight; queued follow-up");
                return WriteRequest::Queued;
            }
            state.in_flight = true;
            self.shared.status.send_modify(|status| status.in_flight = true);
        }

        self.runtime
            .spawn(run_writes(Arc::clone(&self.shared), write));
        WriteRequest::Started
    }

    pub fn status(&self) -> WriterStatus {
        *self.shared.status.borrow()
    }

    /// Receiver notified after each completed write.
    pub fn subscribe(&self) -> watch::Receiver<WriterStatus> {
        self.shared.status.subscribe()
    }

    /// Resolves once no write is running or queued.
    pub async fn wait_idle(&self) -> WriterStatus {
        let mut receiver = self.shared.status.subscribe();
        let idle = receiver
            .wait_for(|status| !status.in_flight)
            .await
            .map(|status| *status);
        idle.unwrap_or_else(|_| self.status())
    }
}

impl std::fmt::Debug for SaveWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveWriter")
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

async fn run_writes(shared: Arc<Shared>, first: PendingWrite) {
    let mut next = Some(first);
    while let Some(write) = next.take() {
        let succeeded = write_once(&shared, write).await;

        // Status is published under the state lock so a concurrent request
        // can never be overwritten by a stale idle flag.
        let mut state = shared.lock_state();
        next = state.pending.take();
        state.in_flight = next.is_some();
        let in_flight = state.in_flight;
        shared.status.send_modify(|status| {
            if succeeded {
                status.completed += 1;
            } else {
                status.failed += 1;
            }
            status.in_flight = in_flight;
        });
        drop(state);
    }
}

async fn write_once(shared: &Shared, write: PendingWrite) -> bool {
    let repository = Arc::clone(&shared.repository);
    let key = write.key.clone();
    let size = write.bytes.len();

    let result =
        tokio::task::spawn_blocking(move || repository.save(&write.key, &write.bytes)).await;
    match result {
        Ok(Ok(())) => {
            info!(save = %key, bytes = size, "save written");
            true
        }
        Ok(Err(err)) => {
            error!(save = %key, error = %err, "save write failed");
            false
        }
        Err(err) => {
            error!(save = %key, error = %err, "save write task failed");
            false
        }
    }
}
