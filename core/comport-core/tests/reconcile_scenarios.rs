use std::rc::Rc;

use chrono::{DateTime, Duration, Utc};
use comport_core::{
    format_labels_in, reconcile, HistoryStore, MemoryNotifier, NotificationMode, Notifier,
    PassContext, PortMonitor, PortSnapshotEntry, RetentionPolicy, Settings, StaticPortSource,
    TransitionKind,
};

fn t0() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-03-01T12:00:00Z")
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

fn port(device: &str, name: &str) -> PortSnapshotEntry {
    PortSnapshotEntry::new(device, name)
}

/// Drives passes against one store with a fixed retention policy.
struct Harness {
    store: HistoryStore,
    retention: RetentionPolicy,
}

impl Harness {
    fn new(retention: RetentionPolicy) -> Self {
        Self {
            store: HistoryStore::new(),
            retention,
        }
    }

    fn pass(
        &mut self,
        snapshot: &[PortSnapshotEntry],
        now: DateTime<Utc>,
        initial: bool,
    ) -> Vec<(TransitionKind, String)> {
        reconcile(
            &mut self.store,
            snapshot,
            PassContext {
                now,
                is_initial_pass: initial,
                retention: self.retention,
            },
        )
        .into_iter()
        .map(|e| (e.kind, e.device_id))
        .collect()
    }
}

#[test]
fn test_unchanged_snapshot_is_a_no_op() {
    let mut h = Harness::new(RetentionPolicy::Show);
    let snapshot = vec![port("COM1:", "Port A"), port("COM2:", "Port B")];
    h.pass(&[], t0(), true);

    let first = h.pass(&snapshot, t0(), false);
    assert_eq!(first.len(), 2);
    let before = h.store.records().to_vec();

    let second = h.pass(&snapshot, t0() + Duration::seconds(1), false);
    assert!(second.is_empty());
    assert_eq!(h.store.records(), before.as_slice());
}

#[test]
fn test_initial_pass_records_baseline_silently() {
    let mut h = Harness::new(RetentionPolicy::Show);
    let events = h.pass(
        &[port("COM1:", "Port A"), port("COM3:", "USB Serial Device")],
        t0(),
        true,
    );

    assert!(events.is_empty());
    assert_eq!(h.store.len(), 2);
    for record in h.store.iter() {
        assert!(record.connected);
        assert_eq!(record.connected_at, None);
        assert_eq!(record.disconnected_at, None);
    }
}

#[test]
fn test_connect_then_disconnect() {
    let mut h = Harness::new(RetentionPolicy::Show);
    assert!(h.pass(&[port("COM1:", "Port A")], t0(), true).is_empty());

    let later = t0() + Duration::seconds(5);
    let events = h.pass(&[], later, false);

    assert_eq!(events, vec![(TransitionKind::Disconnected, "COM1:".to_string())]);
    let record = h.store.find("COM1:").expect("record kept");
    assert!(!record.connected);
    assert_eq!(record.disconnected_at, Some(later));
}

#[test]
fn test_hide_immediately_drops_record_in_same_pass() {
    let mut h = Harness::new(RetentionPolicy::HideImmediately);
    h.pass(&[port("COM1:", "Port A")], t0(), true);

    let events = h.pass(&[], t0() + Duration::seconds(5), false);

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].0, TransitionKind::Disconnected);
    assert!(h.store.find("COM1:").is_none());
    assert!(h.store.is_empty());
}

#[test]
fn test_hide_after_waits_for_timeout() {
    let mut h = Harness::new(RetentionPolicy::HideAfter { timeout_secs: 60 });
    h.pass(&[port("COM1:", "Port A"), port("COM2:", "Port B")], t0(), true);

    let gone_at = t0() + Duration::seconds(10);
    h.pass(&[port("COM2:", "Port B")], gone_at, false);
    assert!(h.store.find("COM1:").is_some());

    h.pass(&[port("COM2:", "Port B")], gone_at + Duration::seconds(59), false);
    assert!(h.store.find("COM1:").is_some());

    let events = h.pass(&[port("COM2:", "Port B")], gone_at + Duration::seconds(60), false);
    assert!(events.is_empty());
    assert!(h.store.find("COM1:").is_none());
    assert!(h.store.find("COM2:").is_some());
}

#[test]
fn test_port_dropped_by_retention_returns_as_new_record() {
    let mut h = Harness::new(RetentionPolicy::HideAfter { timeout_secs: 60 });
    h.pass(&[], t0(), true);
    h.pass(
        &[port("COM5:", "FTDI USB Serial Port").with_hardware_id("FTDIBUS\\VID_0403+PID_6001")],
        t0(),
        false,
    );
    h.pass(&[], t0() + Duration::seconds(5), false);
    h.pass(&[], t0() + Duration::seconds(70), false);
    assert!(h.store.find("COM5:").is_none());

    let back = t0() + Duration::seconds(80);
    let events = h.pass(&[port("COM5:", "Arduino Uno")], back, false);

    assert_eq!(events, vec![(TransitionKind::Connected, "COM5:".to_string())]);
    let record = h.store.find("COM5:").expect("record recreated");
    assert!(record.connected);
    assert_eq!(record.connected_at, Some(back));
    assert_eq!(record.disconnected_at, None);
    assert_eq!(record.display_name, "Arduino Uno");
    assert_eq!(record.hardware_id, None);
    assert_eq!(h.store.len(), 1);
}

#[test]
fn test_hide_immediately_then_reconnect_uses_new_details() {
    let mut h = Harness::new(RetentionPolicy::HideImmediately);
    h.pass(
        &[port("COM6:", "Old Name").with_hardware_id("USB\\VID_1111&PID_2222")],
        t0(),
        true,
    );
    h.pass(&[], t0() + Duration::seconds(1), false);
    assert!(h.store.is_empty());

    let back = t0() + Duration::seconds(2);
    let events = h.pass(
        &[port("COM6:", "New Name").with_hardware_id("USB\\VID_2341&PID_0043")],
        back,
        false,
    );

    assert_eq!(events, vec![(TransitionKind::Connected, "COM6:".to_string())]);
    let record = h.store.find("COM6:").expect("record recreated");
    assert_eq!(record.connected_at, Some(back));
    assert_eq!(record.disconnected_at, None);
    assert_eq!(record.display_name, "New Name");
    assert_eq!(record.hardware_id.as_deref(), Some("USB\\VID_2341&PID_0043"));
}

#[test]
fn test_rename_keeps_identity() {
    let mut h = Harness::new(RetentionPolicy::Show);
    h.pass(&[], t0(), true);
    h.pass(&[port("COM4:", "X")], t0(), false);

    let events = h.pass(&[port("COM4:", "Y")], t0() + Duration::seconds(1), false);

    assert!(events.is_empty());
    assert_eq!(h.store.len(), 1);
    assert_eq!(h.store.find("COM4:").map(|r| r.display_name.as_str()), Some("Y"));
}

#[test]
fn test_most_recent_transition_comes_first() {
    let mut h = Harness::new(RetentionPolicy::Show);
    h.pass(&[port("C", "Port C")], t0(), true);
    h.pass(&[], t0() + Duration::seconds(1), false);

    h.pass(&[port("A", "Port A")], t0() + Duration::seconds(2), false);
    h.pass(
        &[port("A", "Port A"), port("B", "Port B")],
        t0() + Duration::seconds(3),
        false,
    );
    let events = h.pass(
        &[port("A", "Port A"), port("B", "Port B"), port("C", "Port C")],
        t0() + Duration::seconds(4),
        false,
    );

    assert_eq!(events, vec![(TransitionKind::Connected, "C".to_string())]);
    assert_eq!(h.store.device_ids(), vec!["C", "B", "A"]);
}

#[test]
fn test_simultaneous_transitions_get_exact_seconds() {
    let mut h = Harness::new(RetentionPolicy::Show);
    h.pass(&[], t0(), true);
    h.pass(&[port("COM1:", "Port A"), port("COM2:", "Port B")], t0(), false);

    let now = t0() + Duration::seconds(1);
    let labels = format_labels_in(h.store.records(), now, &Utc);
    assert_eq!(labels, vec!["1s", "1s"]);

    let mut lone = Harness::new(RetentionPolicy::Show);
    lone.pass(&[], t0(), true);
    lone.pass(&[port("COM1:", "Port A")], t0(), false);
    let labels = format_labels_in(lone.store.records(), t0() + Duration::seconds(20), &Utc);
    assert_eq!(labels, vec!["Just now"]);
}

struct SharedNotifier(Rc<MemoryNotifier>);

impl Notifier for SharedNotifier {
    fn mode(&self) -> NotificationMode {
        self.0.mode()
    }

    fn notify(&self, title: &str, body: &str) -> comport_core::Result<()> {
        self.0.notify(title, body)
    }
}

#[test]
fn test_monitor_announces_only_after_baseline() {
    let sent = Rc::new(MemoryNotifier::new());
    let mut monitor = PortMonitor::new(
        StaticPortSource::new(vec![port("COM1:", "Communications Port")]),
        Settings::default(),
        Box::new(SharedNotifier(Rc::clone(&sent))),
    );

    monitor.refresh_at(true, t0());
    assert!(sent.sent().is_empty());

    monitor.source_mut().set_ports(vec![
        port("COM1:", "Communications Port"),
        port("COM3:", "USB Serial Device").with_hardware_id("USB\\VID_2341&PID_0043"),
    ]);
    monitor.refresh_at(false, t0() + Duration::seconds(3));

    // enumeration failure reads as everything unplugged
    monitor.source_mut().set_failing();
    monitor.refresh_at(false, t0() + Duration::seconds(6));

    assert_eq!(
        sent.bodies(),
        vec![
            "Connected COM3: USB Serial Device",
            "Removed COM3: USB Serial Device",
            "Removed COM1: Communications Port",
        ]
    );
    assert_eq!(monitor.status_line(), "Removed COM3: USB Serial Device");
    assert_eq!(monitor.history().device_ids(), vec!["COM1:", "COM3:"]);
}
