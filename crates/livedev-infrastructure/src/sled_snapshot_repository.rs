//! Embedded-database snapshot repository.
//!
//! The snapshot lives in the sled tree `sandboxState` under the single key
//! `currentState`. Every save overwrites it.

use crate::snapshot_codec::SnapshotCodec;
use async_trait::async_trait;
use livedev_core::error::{Result, SandboxError};
use livedev_core::session::{SessionSnapshot, SnapshotRepository};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

const STORE_NAME: &str = "sandboxState";
const STATE_KEY: &str = "currentState";

fn sled_error(context: &str, err: sled::Error) -> SandboxError {
    SandboxError::data_access(format!("{}: {}", context, err))
}

fn join_error(err: tokio::task::JoinError) -> SandboxError {
    SandboxError::internal(format!("Failed to join task: {}", err))
}

/// sled-backed [`SnapshotRepository`].
#[derive(Clone)]
pub struct SledSnapshotRepository {
    db: sled::Db,
    tree: sled::Tree,
    codec: Arc<SnapshotCodec>,
}

impl SledSnapshotRepository {
    /// Opens (or creates) the database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let db = sled::open(path).map_err(|e| sled_error("Failed to open database", e))?;
        let tree = db
            .open_tree(STORE_NAME)
            .map_err(|e| sled_error("Failed to open state tree", e))?;
        Ok(Self {
            db,
            tree,
            codec: Arc::new(SnapshotCodec::new()),
        })
    }

    /// Stores a raw payload as-is, bypassing the codec.
    pub async fn put_raw(&self, raw: Vec<u8>) -> Result<()> {
        let tree = self.tree.clone();
        tokio::task::spawn_blocking(move || {
            tree.insert(STATE_KEY, raw)
                .map_err(|e| sled_error("Failed to write state", e))?;
            tree.flush()
                .map_err(|e| sled_error("Failed to flush state", e))?;
            Ok::<_, SandboxError>(())
        })
        .await
        .map_err(join_error)?
    }

    /// Bytes currently on disk for the whole database.
    pub fn size_on_disk(&self) -> Result<u64> {
        self.db
            .size_on_disk()
            .map_err(|e| sled_error("Failed to read database size", e))
    }
}

#[async_trait]
impl SnapshotRepository for SledSnapshotRepository {
    async fn load(&self) -> Result<Option<SessionSnapshot>> {
        let tree = self.tree.clone();
        let raw = tokio::task::spawn_blocking(move || tree.get(STATE_KEY))
            .await
            .map_err(join_error)?
            .map_err(|e| sled_error("Failed to read state", e))?;

        match raw {
            Some(bytes) => self.codec.decode(&bytes),
            None => Ok(None),
        }
    }

    async fn save(&self, snapshot: &SessionSnapshot) -> Result<()> {
        let encoded = self.codec.encode(snapshot)?;
        debug!("Saving snapshot ({} bytes)", encoded.len());
        self.put_raw(encoded.into_bytes()).await
    }

    async fn clear(&self) -> Result<()> {
        let tree = self.tree.clone();
        tokio::task::spawn_blocking(move || {
            tree.remove(STATE_KEY)
                .map_err(|e| sled_error("Failed to clear state", e))?;
            tree.flush()
                .map_err(|e| sled_error("Failed to flush state", e))?;
            Ok::<_, SandboxError>(())
        })
        .await
        .map_err(join_error)?
    }
}
