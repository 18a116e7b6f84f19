//! # comport-core
//!
//! Serial port history engine behind the `comport-notify` watcher: keeps an
//! ordered list of every port seen this session, reconciles it against fresh
//! snapshots, and reports arrivals and removals.
//!
//! ## Design Principles
//!
//! - **Synchronous**: No async runtime dependency. Callers drive passes themselves.
//! - **Not thread-safe**: One owner mutates the history; wrap in a `Mutex` if shared.
//! - **Graceful degradation**: Missing or corrupt settings yield defaults, and a
//!   failed enumeration is treated as an empty snapshot.
//! - **Injected clock**: Every time-dependent operation takes `now` explicitly.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use comport_core::{PortMonitor, Settings, SysfsPortSource};
//!
//! let mut monitor = PortMonitor::with_configured_notifier(SysfsPortSource::new(), Settings::default());
//! monitor.refresh(true);
//! for event in monitor.refresh(false) {
//!     println!("{}", event.message());
//! }
//! ```

pub mod error;
pub mod format;
pub mod history;
pub mod monitor;
pub mod notify;
pub mod reconcile;
pub mod retention;
pub mod settings;
pub mod source;
pub mod storage;
pub mod types;
pub mod view;

pub use error::{PortError, Result};
pub use format::{
    format_labels, format_labels_in, format_time_label, format_time_label_in, just_now_allowed,
    JUST_NOW_WINDOW_SECS,
};
pub use history::HistoryStore;
pub use monitor::{PortMonitor, IDLE_STATUS};
pub use notify::{
    notifier_for, BalloonNotifier, MemoryNotifier, Notifier, OffNotifier, ToastNotifier,
    NOTIFICATION_TITLE,
};
pub use reconcile::{reconcile, PassContext};
pub use retention::{RetentionPolicy, DEFAULT_RETENTION_TIMEOUT_SECS};
pub use settings::{DisconnectedMode, FileSettings, NotificationMode, Settings, SettingsSource};
pub use source::{PortSource, StaticPortSource, SysfsPortSource};
pub use storage::StorageConfig;
pub use types::*;
pub use view::{HistoryRow, HistoryView, EMPTY_PLACEHOLDER};
