//! Core types shared by the reconciler, the formatter and the CLI.
//!
//! Timestamps are `DateTime<Utc>`. A record first seen during the startup
//! pass has `connected_at == None`, meaning "present since process start".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════════
// Snapshot Types
// ═══════════════════════════════════════════════════════════════════════════════

/// One currently-present port, as reported by a single enumeration call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSnapshotEntry {
    /// Stable identifier (e.g. `COM3:` or `/dev/ttyUSB0`).
    pub device_id: String,
    /// Friendly name shown next to the device id.
    pub display_name: String,
    #[serde(default)]
    pub hardware_id: Option<String>,
}

impl PortSnapshotEntry {
    pub fn new(device_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            display_name: display_name.into(),
            hardware_id: None,
        }
    }

    pub fn with_hardware_id(mut self, hardware_id: impl Into<String>) -> Self {
        self.hardware_id = Some(hardware_id.into());
        self
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// History Types
// ═══════════════════════════════════════════════════════════════════════════════

/// A port the process has observed at least once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub device_id: String,
    pub display_name: String,
    #[serde(default)]
    pub hardware_id: Option<String>,
    pub connected: bool,
    /// `None` while connected means the port was already present at startup.
    #[serde(default)]
    pub connected_at: Option<DateTime<Utc>>,
    /// Set when the record flips to disconnected, cleared on reconnect.
    #[serde(default)]
    pub disconnected_at: Option<DateTime<Utc>>,
}

impl HistoryRecord {
    /// Builds a freshly connected record from a snapshot entry.
    pub fn connected_from(entry: &PortSnapshotEntry, connected_at: Option<DateTime<Utc>>) -> Self {
        Self {
            device_id: entry.device_id.clone(),
            display_name: entry.display_name.clone(),
            hardware_id: entry.hardware_id.clone(),
            connected: true,
            connected_at,
            disconnected_at: None,
        }
    }

    /// The timestamp that describes the record's current state.
    ///
    /// `None` is the startup sentinel.
    pub fn relevant_timestamp(&self) -> Option<DateTime<Utc>> {
        if self.connected {
            self.connected_at
        } else {
            self.disconnected_at
        }
    }

    /// Seconds since the record disconnected, or `None` while connected.
    pub fn disconnected_for_secs(&self, now: DateTime<Utc>) -> Option<i64> {
        if self.connected {
            return None;
        }
        self.disconnected_at
            .map(|at| now.signed_duration_since(at).num_seconds())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Transition Types
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    Connected,
    Disconnected,
}

impl TransitionKind {
    /// Verb used in notification bodies.
    pub fn verb(self) -> &'static str {
        match self {
            TransitionKind::Connected => "Connected",
            TransitionKind::Disconnected => "Removed",
        }
    }
}

/// A connect or disconnect to announce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionEvent {
    pub kind: TransitionKind,
    pub device_id: String,
    pub display_name: String,
}

impl TransitionEvent {
    pub fn from_record(kind: TransitionKind, record: &HistoryRecord) -> Self {
        Self {
            kind,
            device_id: record.device_id.clone(),
            display_name: record.display_name.clone(),
        }
    }

    /// Notification body, e.g. `Connected COM3: USB Serial Device`.
    pub fn message(&self) -> String {
        format!("{} {} {}", self.kind.verb(), self.device_id, self.display_name)
    }
}
