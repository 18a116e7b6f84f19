//! Ordered, process-lifetime history of observed ports.
//!
//! Records are kept most-recently-transitioned first; that order is the
//! display order. `device_id` is unique across the store.
//!
//! Lookups are linear scans. Port counts are in the tens, so a side index
//! would cost more to keep in sync across move-to-front than it saves.

use crate::types::HistoryRecord;

/// In-memory ordered store of [`HistoryRecord`]s.
///
/// Not thread-safe; owned by whichever thread drives reconciliation.
#[derive(Debug, Default, Clone)]
pub struct HistoryStore {
    records: Vec<HistoryRecord>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find(&self, device_id: &str) -> Option<&HistoryRecord> {
        self.records.iter().find(|r| r.device_id == device_id)
    }

    pub(crate) fn find_mut(&mut self, device_id: &str) -> Option<&mut HistoryRecord> {
        self.records.iter_mut().find(|r| r.device_id == device_id)
    }

    fn position(&self, device_id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.device_id == device_id)
    }

    /// Moves the record to the head, keeping its identity. No-op if absent
    /// or already first.
    pub fn move_to_front(&mut self, device_id: &str) {
        match self.position(device_id) {
            Some(0) | None => {}
            Some(index) => {
                let record = self.records.remove(index);
                self.records.insert(0, record);
            }
        }
    }

    /// Deletes the record entirely, returning it if it existed.
    pub fn remove(&mut self, device_id: &str) -> Option<HistoryRecord> {
        let index = self.position(device_id)?;
        Some(self.records.remove(index))
    }

    /// Inserts a record at the head.
    ///
    /// Returns `false` and leaves the store untouched if a record with the
    /// same `device_id` already exists.
    pub fn insert_new(&mut self, record: HistoryRecord) -> bool {
        if self.position(&record.device_id).is_some() {
            return false;
        }
        self.records.insert(0, record);
        true
    }

    /// Records in display order.
    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Device ids in display order.
    pub fn device_ids(&self) -> Vec<String> {
        self.records.iter().map(|r| r.device_id.clone()).collect()
    }

    #[cfg(test)]
    pub fn set_disconnected_at_for_test(
        &mut self,
        device_id: &str,
        timestamp: chrono::DateTime<chrono::Utc>,
    ) {
        if let Some(record) = self.find_mut(device_id) {
            record.disconnected_at = Some(timestamp);
        }
    }
}

impl<'a> IntoIterator for &'a HistoryStore {
    type Item = &'a HistoryRecord;
    type IntoIter = std::slice::Iter<'a, HistoryRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
