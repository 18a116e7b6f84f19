//! Merges one port snapshot into the history.
//!
//! This is a full snapshot diff, not an incremental protocol: every call sees
//! the complete set of present ports and derives transitions by comparing it
//! with the store.
//!
//! ```text
//! snapshot ──► update seen records / insert new ──► disconnect unseen ──► retention
//!                     │                                  │
//!                     └──── Connected events ────────────┴── Disconnected events
//! ```
//!
//! The initial pass records everything as a baseline: new records get the
//! startup sentinel (`connected_at == None`) and no events are emitted.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::history::HistoryStore;
use crate::retention::RetentionPolicy;
use crate::types::{HistoryRecord, PortSnapshotEntry, TransitionEvent, TransitionKind};

/// Inputs that stay fixed for the whole pass.
#[derive(Debug, Clone, Copy)]
pub struct PassContext {
    pub now: DateTime<Utc>,
    pub is_initial_pass: bool,
    /// Read once per pass so a settings change mid-pass can't split behavior.
    pub retention: RetentionPolicy,
}

/// Advances `store` to reflect `snapshot` and returns the transitions to
/// announce, connections first, then disconnections.
pub fn reconcile(
    store: &mut HistoryStore,
    snapshot: &[PortSnapshotEntry],
    ctx: PassContext,
) -> Vec<TransitionEvent> {
    let mut events = Vec::new();
    let mut seen: HashSet<String> = HashSet::with_capacity(snapshot.len());

    for entry in snapshot {
        if !seen.insert(entry.device_id.clone()) {
            warn!(device = %entry.device_id, "Duplicate device in snapshot, keeping first entry");
            continue;
        }

        if let Some(event) = merge_entry(store, entry, &ctx) {
            events.push(event);
        }
    }

    events.extend(disconnect_unseen(store, &seen, &ctx));
    apply_retention(store, &ctx);

    events
}

fn merge_entry(
    store: &mut HistoryStore,
    entry: &PortSnapshotEntry,
    ctx: &PassContext,
) -> Option<TransitionEvent> {
    let Some(record) = store.find_mut(&entry.device_id) else {
        let connected_at = if ctx.is_initial_pass {
            None
        } else {
            Some(ctx.now)
        };
        let record = HistoryRecord::connected_from(entry, connected_at);
        let event = (!ctx.is_initial_pass)
            .then(|| TransitionEvent::from_record(TransitionKind::Connected, &record));
        debug!(device = %entry.device_id, name = %entry.display_name, "New port recorded");
        store.insert_new(record);
        return event;
    };

    if record.display_name != entry.display_name {
        debug!(
            device = %entry.device_id,
            from = %record.display_name,
            to = %entry.display_name,
            "Port renamed"
        );
        record.display_name = entry.display_name.clone();
    }
    if record.hardware_id != entry.hardware_id {
        record.hardware_id = entry.hardware_id.clone();
    }

    if record.connected {
        return None;
    }

    record.connected = true;
    record.connected_at = Some(ctx.now);
    record.disconnected_at = None;
    let event = (!ctx.is_initial_pass)
        .then(|| TransitionEvent::from_record(TransitionKind::Connected, record));
    debug!(device = %entry.device_id, "Port reconnected");

    store.move_to_front(&entry.device_id);
    event
}

fn disconnect_unseen(
    store: &mut HistoryStore,
    seen: &HashSet<String>,
    ctx: &PassContext,
) -> Vec<TransitionEvent> {
    let gone: Vec<String> = store
        .iter()
        .filter(|r| r.connected && !seen.contains(&r.device_id))
        .map(|r| r.device_id.clone())
        .collect();

    let mut events = Vec::with_capacity(gone.len());
    for device_id in gone {
        let Some(record) = store.find_mut(&device_id) else {
            continue;
        };
        record.connected = false;
        record.disconnected_at = Some(ctx.now);
        debug!(device = %device_id, "Port disconnected");

        if ctx.is_initial_pass {
            continue;
        }
        events.push(TransitionEvent::from_record(
            TransitionKind::Disconnected,
            record,
        ));
        store.move_to_front(&device_id);
    }
    events
}

fn apply_retention(store: &mut HistoryStore, ctx: &PassContext) {
    let expired: Vec<String> = store
        .iter()
        .filter(|r| ctx.retention.should_remove(r, ctx.now))
        .map(|r| r.device_id.clone())
        .collect();

    for device_id in expired {
        store.remove(&device_id);
        debug!(device = %device_id, retention = ?ctx.retention, "Disconnected port dropped from history");
    }
}
