//! In-process league store used for local runs and tests.

use std::{
    fmt,
    sync::{
        Mutex,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::Duration,
};

use futures::future::{self, BoxFuture};

use crate::dao::{
    league_store::{LeagueStore, VersionedDocument},
    models::LeagueDocument,
    storage::{StorageError, StorageResult},
};

#[derive(Debug)]
struct InjectedFailure;

impl fmt::Display for InjectedFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("injected write failure")
    }
}

impl std::error::Error for InjectedFailure {}

#[derive(Default)]
struct Slot {
    document: Option<LeagueDocument>,
    version: u64,
}

/// Keeps the document in memory; versions are a plain counter.
#[derive(Default)]
pub struct MemoryLeagueStore {
    slot: Mutex<Slot>,
    fail_writes: AtomicBool,
    latency_ms: AtomicU64,
}

impl MemoryLeagueStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding `document` at version 1.
    pub fn with_document(document: LeagueDocument) -> Self {
        Self {
            slot: Mutex::new(Slot {
                document: Some(document),
                version: 1,
            }),
            fail_writes: AtomicBool::new(false),
            latency_ms: AtomicU64::new(0),
        }
    }

    /// Make every subsequent write fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Delay every response by `latency`. Writes still land immediately.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms.load(Ordering::SeqCst))
    }

    /// Copy of the stored document.
    pub fn document(&self) -> Option<LeagueDocument> {
        self.lock().document.clone()
    }

    /// Number of successful writes so far (plus one if seeded).
    pub fn version(&self) -> u64 {
        self.lock().version
    }

    /// Overwrite the stored document as another writer would.
    pub fn overwrite(&self, document: LeagueDocument) {
        let mut slot = self.lock();
        slot.document = Some(document);
        slot.version += 1;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Slot> {
        self.slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(
        &self,
        document: LeagueDocument,
        expected_version: Option<String>,
    ) -> StorageResult<Option<String>> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::unavailable(
                "memory store rejected the write".into(),
                InjectedFailure,
            ));
        }

        let mut slot = self.lock();
        let current = slot.document.as_ref().map(|_| slot.version.to_string());
        if let Some(expected) = expected_version {
            if current.as_deref() != Some(expected.as_str()) {
                return Err(StorageError::conflict(expected, current));
            }
        }

        slot.document = Some(document);
        slot.version += 1;
        Ok(Some(slot.version.to_string()))
    }
}

fn delayed<T: Send + 'static>(latency: Duration, value: T) -> BoxFuture<'static, T> {
    if latency.is_zero() {
        return Box::pin(future::ready(value));
    }
    Box::pin(async move {
        tokio::time::sleep(latency).await;
        value
    })
}

impl LeagueStore for MemoryLeagueStore {
    fn load(&self) -> BoxFuture<'static, StorageResult<Option<VersionedDocument>>> {
        let slot = self.lock();
        let loaded = slot.document.clone().map(|document| VersionedDocument {
            document,
            version: Some(slot.version.to_string()),
        });
        delayed(self.latency(), Ok(loaded))
    }

    fn save(
        &self,
        document: LeagueDocument,
        expected_version: Option<String>,
    ) -> BoxFuture<'static, StorageResult<Option<String>>> {
        delayed(self.latency(), self.write(document, expected_version))
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(future::ready(Ok(())))
    }
}
