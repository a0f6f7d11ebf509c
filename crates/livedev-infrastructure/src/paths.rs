//! Unified path management for livedev data.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.local/share/livedev/      # Data directory (or $LIVEDEV_HOME)
//! ├── config.toml              # SandboxConfig
//! ├── state.sled/              # Embedded snapshot database
//! └── exports/                 # Default export destination
//! ```

use livedev_core::error::{Result, SandboxError};
use std::path::PathBuf;

/// Environment variable overriding the data directory.
pub const HOME_ENV: &str = "LIVEDEV_HOME";

const APP_DIR: &str = "livedev";

/// Resolves every on-disk location the sandbox uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LivedevPaths {
    base: PathBuf,
}

impl LivedevPaths {
    /// Uses `base` as the data directory.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Resolves the data directory from `$LIVEDEV_HOME` or the platform default.
    pub fn resolve() -> Result<Self> {
        if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::new(home));
        }
        dirs::data_dir()
            .map(|dir| Self::new(dir.join(APP_DIR)))
            .ok_or_else(|| SandboxError::config("Cannot find home directory"))
    }

    pub fn data_dir(&self) -> &PathBuf {
        &self.base
    }

    pub fn config_file(&self) -> PathBuf {
        self.base.join("config.toml")
    }

    /// Database location, honoring a configured override.
    ///
    /// Relative overrides are resolved against the data directory.
    pub fn database_dir(&self, override_path: Option<&PathBuf>) -> PathBuf {
        match override_path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => self.base.join(path),
            None => self.base.join("state.sled"),
        }
    }

    pub fn exports_dir(&self) -> PathBuf {
        self.base.join("exports")
    }
}
