pub mod chat;
pub mod config;
pub mod container;
pub mod export;
pub mod files;
pub mod init;
pub mod preview;

use anyhow::{Context, Result};
use livedev_application::SandboxSession;
use livedev_core::config::SandboxConfig;
use livedev_infrastructure::{ConfigService, LivedevPaths, SledSnapshotRepository};
use livedev_interaction::OfflineChatAgent;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Resolves the data directory from `--home`, `$LIVEDEV_HOME` or the platform default.
pub fn resolve_paths(home: Option<&Path>) -> Result<LivedevPaths> {
    match home {
        Some(home) => Ok(LivedevPaths::new(home)),
        None => LivedevPaths::resolve().context("Failed to resolve the data directory"),
    }
}

/// A session opened against the on-disk database.
pub struct Workspace {
    pub paths: LivedevPaths,
    pub config: SandboxConfig,
    /// The database backing `session`.
    pub database: Arc<SledSnapshotRepository>,
    pub session: SandboxSession,
}

impl Workspace {
    pub async fn open(home: Option<&Path>) -> Result<Self> {
        let paths = resolve_paths(home)?;
        let config = ConfigService::new(paths.config_file())
            .get_config()
            .await
            .context("Failed to load config.toml")?;

        let db_dir: PathBuf = paths.database_dir(config.persistence.db_path.as_ref());
        if let Some(parent) = db_dir.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let database = Arc::new(
            SledSnapshotRepository::open(&db_dir)
                .with_context(|| format!("Failed to open database at {}", db_dir.display()))?,
        );
        debug!("Opened database at {}", db_dir.display());

        let session =
            SandboxSession::open(&config, database.clone(), Arc::new(OfflineChatAgent)).await;
        Ok(Self {
            paths,
            config,
            database,
            session,
        })
    }

    /// Persists the session and stops its background tasks.
    pub async fn close(self) {
        self.session.shutdown().await;
    }
}
