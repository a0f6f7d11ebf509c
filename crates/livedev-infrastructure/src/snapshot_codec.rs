//! Encoding of session snapshots as flat, versioned JSON.
//!
//! Shared by every snapshot repository so all backends read and write the
//! exact same payload.

use crate::dto::{
    LEGACY_SNAPSHOT_VERSION, SNAPSHOT_ENTITY, SUPPORTED_SNAPSHOT_VERSIONS,
    create_snapshot_migrator,
};
use livedev_core::error::{Result, SandboxError};
use livedev_core::session::SessionSnapshot;
use serde_json::Value;
use tracing::warn;
use version_migrate::Migrator;

pub struct SnapshotCodec {
    migrator: Migrator,
}

impl Default for SnapshotCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotCodec {
    pub fn new() -> Self {
        Self {
            migrator: create_snapshot_migrator(),
        }
    }

    /// Serializes `snapshot` with the current schema version.
    pub fn encode(&self, snapshot: &SessionSnapshot) -> Result<String> {
        self.migrator
            .save_domain_flat(SNAPSHOT_ENTITY, snapshot.clone())
            .map_err(SandboxError::from)
    }

    /// Parses and migrates a stored payload.
    ///
    /// Payloads tagged with an unsupported version yield `Ok(None)` after a
    /// warning; malformed payloads are errors.
    pub fn decode(&self, raw: &[u8]) -> Result<Option<SessionSnapshot>> {
        let mut value: Value = serde_json::from_slice(raw)?;
        let Some(object) = value.as_object_mut() else {
            return Err(SandboxError::json("snapshot payload is not a JSON object"));
        };

        if !object.contains_key("version") {
            object.insert(
                "version".to_string(),
                Value::String(LEGACY_SNAPSHOT_VERSION.to_string()),
            );
        }
        let version = match object.get("version") {
            Some(Value::String(v)) => v.clone(),
            Some(other) => other.to_string(),
            None => LEGACY_SNAPSHOT_VERSION.to_string(),
        };

        if !SUPPORTED_SNAPSHOT_VERSIONS.contains(&version.as_str()) {
            warn!("Ignoring stored snapshot with unsupported version {}", version);
            return Ok(None);
        }

        let snapshot: SessionSnapshot = self.migrator.load_flat_from(SNAPSHOT_ENTITY, value)?;
        Ok(Some(snapshot))
    }
}
