//! In-memory snapshot repository for tests and throwaway sessions.

use crate::snapshot_codec::SnapshotCodec;
use async_trait::async_trait;
use livedev_core::error::{Result, SandboxError};
use livedev_core::session::{SessionSnapshot, SnapshotRepository};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// Keeps the encoded snapshot in memory.
///
/// Payloads go through the same codec as the on-disk backend, so migrations
/// are exercised here too.
#[derive(Clone, Default)]
pub struct InMemorySnapshotRepository {
    payload: Arc<Mutex<Option<Vec<u8>>>>,
    codec: Arc<SnapshotCodec>,
    save_count: Arc<AtomicUsize>,
    fail_saves: Arc<AtomicBool>,
}

impl InMemorySnapshotRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-seeded with a raw payload.
    pub fn with_raw(raw: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: Arc::new(Mutex::new(Some(raw.into()))),
            ..Self::default()
        }
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.save_count.load(Ordering::SeqCst)
    }

    /// Makes every subsequent save fail with a data access error.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub async fn raw(&self) -> Option<Vec<u8>> {
        self.payload.lock().await.clone()
    }
}

#[async_trait]
impl SnapshotRepository for InMemorySnapshotRepository {
    async fn load(&self) -> Result<Option<SessionSnapshot>> {
        let payload = self.payload.lock().await;
        match payload.as_deref() {
            Some(bytes) => self.codec.decode(bytes),
            None => Ok(None),
        }
    }

    async fn save(&self, snapshot: &SessionSnapshot) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(SandboxError::data_access("snapshot store is unavailable"));
        }
        let encoded = self.codec.encode(snapshot)?;
        *self.payload.lock().await = Some(encoded.into_bytes());
        self.save_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.payload.lock().await = None;
        Ok(())
    }
}
