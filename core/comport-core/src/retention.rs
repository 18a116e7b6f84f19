//! Retention of disconnected records.
//!
//! Connected records are never removed. A removed record is gone for good;
//! if the port comes back it starts over as a new record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::HistoryRecord;

/// Timeout used for `hide_after` when none is configured.
pub const DEFAULT_RETENTION_TIMEOUT_SECS: u64 = 60;

/// How long a disconnected record stays in the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum RetentionPolicy {
    /// Keep disconnected records until they reconnect or the process exits.
    #[default]
    Show,
    /// Drop a record in the same pass it is seen disconnected.
    HideImmediately,
    /// Drop a record once it has been disconnected for at least `timeout_secs`.
    HideAfter { timeout_secs: u64 },
}

impl RetentionPolicy {
    pub fn should_remove(&self, record: &HistoryRecord, now: DateTime<Utc>) -> bool {
        if record.connected {
            return false;
        }
        match *self {
            RetentionPolicy::Show => false,
            RetentionPolicy::HideImmediately => true,
            RetentionPolicy::HideAfter { timeout_secs } => {
                // A disconnected record without a timestamp can't age out.
                let Some(age) = record.disconnected_for_secs(now) else {
                    return false;
                };
                let timeout = i64::try_from(timeout_secs).unwrap_or(i64::MAX);
                age >= timeout
            }
        }
    }

    /// True when disconnected records should not be displayed at all.
    pub fn hides_disconnected(&self) -> bool {
        matches!(self, RetentionPolicy::HideImmediately)
    }
}
