//! Display model for the port history (one row per visible record).
//!
//! Rows keep store order. Each row offers the strings a user may want to copy:
//! the hardware id when known, then the device id.

use std::fmt;

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::Serialize;

use crate::format::{format_time_label_in, just_now_allowed};
use crate::history::HistoryStore;
use crate::retention::RetentionPolicy;
use crate::types::HistoryRecord;

/// Description shown when nothing is visible.
pub const EMPTY_PLACEHOLDER: &str = "No serial ports detected";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryRow {
    /// Device id column.
    pub prefix: String,
    /// Friendly name column.
    pub description: String,
    /// Time label column.
    pub label: String,
    /// Disconnected rows render grayed out.
    pub grayed: bool,
    pub copy_targets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryView {
    pub rows: Vec<HistoryRow>,
}

impl HistoryView {
    pub fn build(store: &HistoryStore, retention: RetentionPolicy, now: DateTime<Utc>) -> Self {
        Self::build_in(store, retention, now, &Local)
    }

    pub fn build_in<Tz>(
        store: &HistoryStore,
        retention: RetentionPolicy,
        now: DateTime<Utc>,
        tz: &Tz,
    ) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let visible: Vec<&HistoryRecord> = store
            .iter()
            .filter(|r| r.connected || !retention.hides_disconnected())
            .collect();

        if visible.is_empty() {
            return Self {
                rows: vec![HistoryRow {
                    prefix: String::new(),
                    description: EMPTY_PLACEHOLDER.to_string(),
                    label: String::new(),
                    grayed: true,
                    copy_targets: Vec::new(),
                }],
            };
        }

        let allowed = just_now_allowed(visible.iter().copied(), now);
        let rows = visible
            .into_iter()
            .map(|record| HistoryRow {
                prefix: record.device_id.clone(),
                description: record.display_name.clone(),
                label: format_time_label_in(now, record.relevant_timestamp(), allowed, tz),
                grayed: !record.connected,
                copy_targets: copy_targets(record),
            })
            .collect();

        Self { rows }
    }

    /// True when the view only holds the placeholder row.
    pub fn is_placeholder(&self) -> bool {
        self.rows.len() == 1 && self.rows[0].prefix.is_empty() && self.rows[0].copy_targets.is_empty()
    }

    /// Fixed-width text rendering, one row per line. Widths are in chars.
    pub fn render_text(&self) -> String {
        let width = |column: fn(&HistoryRow) -> &str| {
            self.rows
                .iter()
                .map(|r| column(r).chars().count())
                .max()
                .unwrap_or(0)
        };
        let prefix_width = width(|r| r.prefix.as_str());
        let desc_width = width(|r| r.description.as_str());

        let mut out = String::new();
        for row in &self.rows {
            let marker = if row.grayed { "-" } else { "+" };
            let line = format!(
                "{} {:<pw$}  {:<dw$}  {}",
                marker,
                row.prefix,
                row.description,
                row.label,
                pw = prefix_width,
                dw = desc_width
            );
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}

fn copy_targets(record: &HistoryRecord) -> Vec<String> {
    let mut targets = Vec::with_capacity(2);
    if let Some(hwid) = record.hardware_id.as_deref().filter(|h| !h.is_empty()) {
        targets.push(hwid.to_string());
    }
    if !record.device_id.is_empty() {
        targets.push(record.device_id.clone());
    }
    targets
}
