//! User preferences: notification backend and disconnected-port retention.
//!
//! Stored as JSON in `config.json` under the storage root. Reads never fail:
//! a missing, empty or corrupt file yields defaults (balloon notifications,
//! disconnected ports shown, 60 second timeout).

use std::fmt;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{PortError, Result};
use crate::retention::{RetentionPolicy, DEFAULT_RETENTION_TIMEOUT_SECS};
use crate::storage::StorageConfig;

// ═══════════════════════════════════════════════════════════════════════════════
// Modes
// ═══════════════════════════════════════════════════════════════════════════════

/// Which notifier announces transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NotificationMode {
    Off,
    /// One-line notice from the running process.
    #[default]
    Balloon,
    /// Native desktop notification.
    Toast,
}

impl NotificationMode {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationMode::Off => "off",
            NotificationMode::Balloon => "balloon",
            NotificationMode::Toast => "toast",
        }
    }
}

impl fmt::Display for NotificationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationMode {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(NotificationMode::Off),
            "balloon" => Ok(NotificationMode::Balloon),
            "toast" => Ok(NotificationMode::Toast),
            other => Err(PortError::InvalidSetting {
                field: "notification_mode".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// What happens to ports after they disappear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DisconnectedMode {
    #[default]
    Show,
    Hide,
    HideAfter,
}

impl DisconnectedMode {
    pub fn as_str(self) -> &'static str {
        match self {
            DisconnectedMode::Show => "show",
            DisconnectedMode::Hide => "hide",
            DisconnectedMode::HideAfter => "hide-after",
        }
    }
}

impl fmt::Display for DisconnectedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisconnectedMode {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "show" => Ok(DisconnectedMode::Show),
            "hide" => Ok(DisconnectedMode::Hide),
            "hide-after" => Ok(DisconnectedMode::HideAfter),
            other => Err(PortError::InvalidSetting {
                field: "disconnected_mode".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Settings
// ═══════════════════════════════════════════════════════════════════════════════

fn default_timeout_secs() -> u64 {
    DEFAULT_RETENTION_TIMEOUT_SECS
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub notification_mode: NotificationMode,
    #[serde(default)]
    pub disconnected_mode: DisconnectedMode,
    #[serde(default = "default_timeout_secs")]
    pub disconnected_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            notification_mode: NotificationMode::default(),
            disconnected_mode: DisconnectedMode::default(),
            disconnected_timeout_secs: DEFAULT_RETENTION_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    /// Loads settings, returning defaults if the file is missing or unreadable.
    pub fn load(path: &Path) -> Self {
        let content = match fs_err::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                warn!(error = %e, "Failed to read settings, using defaults");
                return Self::default();
            }
        };

        if content.trim().is_empty() {
            return Self::default();
        }

        match serde_json::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(
                    error = %e,
                    path = %path.display(),
                    "Settings file malformed, using defaults"
                );
                Self::default()
            }
        }
    }

    /// Saves settings atomically (temp file + rename).
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).map_err(|e| PortError::Json {
            context: "Failed to serialize settings".to_string(),
            source: e,
        })?;

        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        fs_err::create_dir_all(dir).map_err(|e| PortError::Io {
            context: "Failed to create settings directory".to_string(),
            source: e,
        })?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| PortError::Io {
            context: "Failed to create temp file".to_string(),
            source: e,
        })?;
        tmp.write_all(content.as_bytes())
            .map_err(|e| PortError::Io {
                context: "Failed to write temp file".to_string(),
                source: e,
            })?;
        tmp.flush().map_err(|e| PortError::Io {
            context: "Failed to flush temp file".to_string(),
            source: e,
        })?;
        tmp.persist(path).map_err(|e| PortError::Io {
            context: "Failed to persist settings".to_string(),
            source: e.error,
        })?;

        Ok(())
    }

    /// Sets the disconnected mode, and the timeout when one is given.
    ///
    /// A zero timeout is rejected for `hide-after` and ignored otherwise.
    pub fn set_retention(&mut self, mode: DisconnectedMode, timeout_secs: Option<u64>) -> Result<()> {
        match (mode, timeout_secs) {
            (DisconnectedMode::HideAfter, Some(0)) => Err(PortError::InvalidSetting {
                field: "disconnected_timeout_secs".to_string(),
                value: "0".to_string(),
            }),
            (_, timeout) => {
                self.disconnected_mode = mode;
                if let Some(secs) = timeout.filter(|secs| *secs > 0) {
                    self.disconnected_timeout_secs = secs;
                }
                Ok(())
            }
        }
    }

    /// The retention policy these settings describe.
    pub fn retention_policy(&self) -> RetentionPolicy {
        match self.disconnected_mode {
            DisconnectedMode::Show => RetentionPolicy::Show,
            DisconnectedMode::Hide => RetentionPolicy::HideImmediately,
            DisconnectedMode::HideAfter => RetentionPolicy::HideAfter {
                timeout_secs: self.disconnected_timeout_secs,
            },
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Settings Sources
// ═══════════════════════════════════════════════════════════════════════════════

/// Where the monitor reads settings from, once per pass.
pub trait SettingsSource {
    fn current(&self) -> Settings;
}

/// Fixed settings (tests, one-shot commands).
impl SettingsSource for Settings {
    fn current(&self) -> Settings {
        self.clone()
    }
}

/// Settings re-read from `config.json` on every call.
#[derive(Debug, Clone)]
pub struct FileSettings {
    storage: StorageConfig,
}

impl FileSettings {
    pub fn new(storage: StorageConfig) -> Self {
        Self { storage }
    }

    /// Applies `change` to the current settings and saves them. Nothing is
    /// written if `change` fails.
    pub fn update<F>(&self, change: F) -> Result<Settings>
    where
        F: FnOnce(&mut Settings) -> Result<()>,
    {
        let mut settings = self.current();
        change(&mut settings)?;
        settings.save(&self.storage.config_file())?;
        Ok(settings)
    }
}

impl SettingsSource for FileSettings {
    fn current(&self) -> Settings {
        Settings::load(&self.storage.config_file())
    }
}
