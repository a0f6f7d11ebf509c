//! Configuration service implementation.
//!
//! Loads `SandboxConfig` from `config.toml` in the data directory and caches
//! it. A missing file means defaults.

use livedev_core::config::SandboxConfig;
use livedev_core::error::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration, filled on first access.
    config: Arc<RwLock<Option<SandboxConfig>>>,
}

impl ConfigService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the configuration, loading from file if not cached.
    pub async fn get_config(&self) -> Result<SandboxConfig> {
        if let Some(cached) = self.config.read().await.as_ref() {
            return Ok(cached.clone());
        }

        let loaded = Self::load_from(&self.path).await?;
        *self.config.write().await = Some(loaded.clone());
        Ok(loaded)
    }

    /// Writes `config` to disk and refreshes the cache.
    pub async fn save(&self, config: &SandboxConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&self.path, config.to_toml()?).await?;
        *self.config.write().await = Some(config.clone());
        info!("Wrote configuration to {}", self.path.display());
        Ok(())
    }

    /// Writes the default configuration unless a file already exists.
    ///
    /// Returns true when a file was created.
    pub async fn init_default(&self) -> Result<bool> {
        if fs::try_exists(&self.path).await? {
            return Ok(false);
        }
        self.save(&SandboxConfig::default()).await?;
        Ok(true)
    }

    async fn load_from(path: &Path) -> Result<SandboxConfig> {
        if !fs::try_exists(path).await? {
            debug!("No config at {}, using defaults", path.display());
            return Ok(SandboxConfig::default());
        }
        let content = fs::read_to_string(path).await?;
        SandboxConfig::from_toml(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livedev_core::container::TransitionPolicy;

    #[tokio::test]
    async fn test_missing_file_yields_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let service = ConfigService::new(temp_dir.path().join("config.toml"));
        assert_eq!(service.get_config().await.unwrap(), SandboxConfig::default());
    }

    #[tokio::test]
    async fn test_init_default_then_reload() {
        let temp_dir = tempfile::tempdir().unwrap();
        let service = ConfigService::new(temp_dir.path().join("nested/config.toml"));
        assert!(service.init_default().await.unwrap());
        assert!(!service.init_default().await.unwrap());

        fs::write(
            service.path(),
            "[lifecycle]\npolicy = \"permissive\"\nmin_latency_ms = 0\nmax_latency_ms = 0\n",
        )
        .await
        .unwrap();

        // cached for the life of the service
        assert_eq!(
            service.get_config().await.unwrap().lifecycle.policy,
            TransitionPolicy::Strict
        );
        let config = ConfigService::new(service.path())
            .get_config()
            .await
            .unwrap();
        assert_eq!(config.lifecycle.policy, TransitionPolicy::Permissive);
        assert_eq!(config.lifecycle.max_latency_ms, 0);
    }

    #[tokio::test]
    async fn test_invalid_file_is_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "lifecycle = 3").await.unwrap();
        let service = ConfigService::new(path);
        assert!(service.get_config().await.unwrap_err().is_serialization());
    }
}
