//! Error types for comport-core operations.
//!
//! Reconciliation itself never fails; these errors only surface at the edges
//! (settings files, port enumeration, notification delivery) where callers
//! decide whether to degrade or report.

/// All errors that can occur in comport-core operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    // ─────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Invalid setting value for {field}: {value}")]
    InvalidSetting { field: String, value: String },

    // ─────────────────────────────────────────────────────────────────────
    // Enumeration Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Port enumeration failed: {0}")]
    EnumerationFailed(String),

    // ─────────────────────────────────────────────────────────────────────
    // Notification Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Notifications are turned off")]
    NotificationsDisabled,

    #[error("Command execution failed: {command}: {details}")]
    CommandFailed { command: String, details: String },

    // ─────────────────────────────────────────────────────────────────────
    // I/O Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON parsing error: {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results using PortError.
pub type Result<T> = std::result::Result<T, PortError>;

impl From<PortError> for String {
    fn from(err: PortError) -> String {
        err.to_string()
    }
}
