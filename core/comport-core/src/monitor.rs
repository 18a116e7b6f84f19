//! PortMonitor - ties enumeration, reconciliation and notification together.
//!
//! The monitor is the single owner of the port history. It is synchronous and
//! not thread-safe: drive it from one thread, or wrap the whole monitor in a
//! `Mutex` held for the duration of each `refresh`.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use comport_core::{FileSettings, PortMonitor, StorageConfig, SysfsPortSource};
//!
//! let settings = FileSettings::new(StorageConfig::from_env()?);
//! let mut monitor = PortMonitor::with_configured_notifier(SysfsPortSource::new(), settings);
//! monitor.refresh(true);
//! // on every device change:
//! let events = monitor.refresh(false);
//! ```

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::PortError;
use crate::history::HistoryStore;
use crate::notify::{notifier_for, Notifier};
use crate::reconcile::{reconcile, PassContext};
use crate::settings::{NotificationMode, SettingsSource};
use crate::source::PortSource;
use crate::types::TransitionEvent;
use crate::view::HistoryView;

/// Status line before any transition has been announced.
pub const IDLE_STATUS: &str = "No serial port changes detected";

pub struct PortMonitor<S, C> {
    source: S,
    settings: C,
    notifier: Box<dyn Notifier>,
    /// Rebuild the notifier whenever the configured mode changes.
    follow_settings: bool,
    history: HistoryStore,
    status_line: String,
}

impl<S: PortSource, C: SettingsSource> PortMonitor<S, C> {
    /// Creates a monitor with a fixed notifier.
    pub fn new(source: S, settings: C, notifier: Box<dyn Notifier>) -> Self {
        Self {
            source,
            settings,
            notifier,
            follow_settings: false,
            history: HistoryStore::new(),
            status_line: IDLE_STATUS.to_string(),
        }
    }

    /// Creates a monitor whose notifier tracks `notification_mode`.
    pub fn with_configured_notifier(source: S, settings: C) -> Self {
        let notifier = notifier_for(settings.current().notification_mode);
        let mut monitor = Self::new(source, settings, notifier);
        monitor.follow_settings = true;
        monitor
    }

    /// Runs one reconciliation pass against a fresh snapshot.
    pub fn refresh(&mut self, is_initial_pass: bool) -> Vec<TransitionEvent> {
        self.refresh_at(is_initial_pass, Utc::now())
    }

    /// [`refresh`](Self::refresh) with an explicit clock reading.
    pub fn refresh_at(&mut self, is_initial_pass: bool, now: DateTime<Utc>) -> Vec<TransitionEvent> {
        let snapshot = match self.source.enumerate() {
            Ok(ports) => ports,
            Err(e) => {
                // Indistinguishable from every port being unplugged at this layer.
                warn!(error = %e, "Port enumeration failed, treating as empty snapshot");
                Vec::new()
            }
        };

        let settings = self.settings.current();
        if self.follow_settings && self.notifier.mode() != settings.notification_mode {
            debug!(mode = %settings.notification_mode, "Switching notifier");
            self.notifier = notifier_for(settings.notification_mode);
        }

        let ctx = PassContext {
            now,
            is_initial_pass,
            retention: settings.retention_policy(),
        };
        let events = reconcile(&mut self.history, &snapshot, ctx);

        debug!(
            ports = snapshot.len(),
            history = self.history.len(),
            transitions = events.len(),
            initial = is_initial_pass,
            "Reconciliation pass complete"
        );

        if let Some(first) = events.first() {
            self.status_line = first.message();
        }
        for event in &events {
            info!(kind = ?event.kind, device = %event.device_id, name = %event.display_name, "Port transition");
            self.deliver(event);
        }

        events
    }

    fn deliver(&self, event: &TransitionEvent) {
        match self.notifier.announce(event) {
            Ok(()) | Err(PortError::NotificationsDisabled) => {}
            Err(e) => warn!(error = %e, device = %event.device_id, "Notification delivery failed"),
        }
    }

    /// Sends a test notification through the current notifier.
    pub fn send_test_notification(&self) -> Result<NotificationMode, PortError> {
        self.notifier
            .notify(crate::notify::NOTIFICATION_TITLE, "Test notification")
            .map(|()| self.notifier.mode())
    }

    /// Read-only history in display order.
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Display rows using the currently configured retention mode.
    pub fn view(&self, now: DateTime<Utc>) -> HistoryView {
        HistoryView::build(&self.history, self.settings.current().retention_policy(), now)
    }

    /// Text of the first transition announced by the latest pass that had any.
    pub fn status_line(&self) -> &str {
        &self.status_line
    }

    pub fn notification_mode(&self) -> NotificationMode {
        self.notifier.mode()
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn settings(&self) -> &C {
        &self.settings
    }
}
