//! Storage paths for comport-notify.
//!
//! All path decisions live here so tests can point everything at a temp dir
//! with [`StorageConfig::with_root`].

use std::env;
use std::path::{Path, PathBuf};

use crate::error::{PortError, Result};

/// Environment variable overriding the storage root.
pub const HOME_ENV_VAR: &str = "COMPORT_NOTIFY_HOME";

const ROOT_DIR_NAME: &str = ".comport-notify";

/// Central configuration for all comport-notify storage paths.
///
/// Production code uses [`StorageConfig::from_env`], which points to
/// `~/.comport-notify/` unless `COMPORT_NOTIFY_HOME` is set.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    root: PathBuf,
}

impl StorageConfig {
    /// Resolves the root from `COMPORT_NOTIFY_HOME` or the home directory.
    pub fn from_env() -> Result<Self> {
        if let Some(root) = env::var_os(HOME_ENV_VAR).filter(|v| !v.is_empty()) {
            return Ok(Self::with_root(PathBuf::from(root)));
        }
        let home = dirs::home_dir().ok_or(PortError::HomeDirNotFound)?;
        Ok(Self::with_root(home.join(ROOT_DIR_NAME)))
    }

    /// Creates a StorageConfig with a custom root directory.
    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to config.json (notification and retention preferences).
    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.json")
    }

    /// Directory for rolling log files.
    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// Creates the logs directory (and root) if needed, returning its path.
    pub fn ensure_logs_dir(&self) -> Result<PathBuf> {
        let dir = self.logs_dir();
        fs_err::create_dir_all(&dir).map_err(|e| PortError::Io {
            context: "Failed to create logs directory".to_string(),
            source: e,
        })?;
        Ok(dir)
    }
}
