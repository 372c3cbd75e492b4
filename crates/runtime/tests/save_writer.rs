use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};

use arpg_runtime::repository::Result as RepoResult;
use arpg_runtime::{
    FileSaveRepository, InMemorySaveRepository, SaveKey, SaveRepository, SaveWriter, WriteRequest,
};

/// Repository whose writes block until the test releases them.
struct GatedRepository {
    inner: InMemorySaveRepository,
    gate: Mutex<Receiver<()>>,
    writes: Mutex<Vec<Vec<u8>>>,
}

impl GatedRepository {
    fn new(gate: Receiver<()>) -> Self {
        Self {
            inner: InMemorySaveRepository::new(),
            gate: Mutex::new(gate),
            writes: Mutex::new(Vec::new()),
        }
    }

    fn writes(&self) -> Vec<Vec<u8>> {
        self.writes.lock().unwrap().clone()
    }
}

impl SaveRepository for GatedRepository {
    fn save(&self, key: &SaveKey, bytes: &[u8]) -> RepoResult<()> {
        self.gate.lock().unwrap().recv().unwrap();
        self.writes.lock().unwrap().push(bytes.to_vec());
        self.inner.save(key, bytes)
    }

    fn load(&self, key: &SaveKey) -> RepoResult<Option<Vec<u8>>> {
        self.inner.load(key)
    }

    fn exists(&self, key: &SaveKey) -> bool {
        self.inner.exists(key)
    }

    fn delete(&self, key: &SaveKey) -> RepoResult<()> {
        self.inner.delete(key)
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn burst_of_requests_collapses_into_one_follow_up() {
    let (release, gate) = mpsc::channel();
    let repository = Arc::new(GatedRepository::new(gate));
    let writer = SaveWriter::new(repository.clone()).expect("tokio runtime");
    let key = SaveKey::new("SaveGame", 0);

    assert_eq!(writer.request(key.clone(), b"one".to_vec()), WriteRequest::Started);
    assert_eq!(writer.request(key.clone(), b"two".to_vec()), WriteRequest::Queued);
    assert_eq!(writer.request(key.clone(), b"three".to_vec()), WriteRequest::Queued);
    assert!(writer.status().in_flight);

    release.send(()).unwrap();
    release.send(()).unwrap();
    let status = writer.wait_idle().await;

    assert!(!status.in_flight);
    assert_eq!(status.completed, 2);
    assert_eq!(status.failed, 0);
    assert_eq!(status.queued, 2);
    assert_eq!(repository.writes(), vec![b"one".to_vec(), b"three".to_vec()]);
    assert_eq!(repository.load(&key).unwrap(), Some(b"three".to_vec()));
}

#[tokio::test]
async fn failed_write_does_not_wedge_the_writer() {
    let dir = tempfile::tempdir().expect("tempdir");
    let repository = Arc::new(FileSaveRepository::new(dir.path()).expect("repo"));
    let writer = SaveWriter::new(repository.clone()).expect("tokio runtime");

    writer.request(SaveKey::new("../outside", 0), b"bad".to_vec());
    let status = writer.wait_idle().await;
    assert_eq!(status.failed, 1);
    assert_eq!(status.completed, 0);

    let key = SaveKey::new("SaveGame", 0);
    assert_eq!(writer.request(key.clone(), b"good".to_vec()), WriteRequest::Started);
    let status = writer.wait_idle().await;
    assert_eq!(status.completed, 1);
    assert_eq!(repository.load(&key).unwrap(), Some(b"good".to_vec()));
}

#[test]
fn writer_requires_a_tokio_runtime() {
    let repository = Arc::new(InMemorySaveRepository::new());
    assert!(matches!(
        SaveWriter::new(repository),
        Err(arpg_runtime::RuntimeError::NoAsyncRuntime)
    ));
}
