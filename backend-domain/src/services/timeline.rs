use std::collections::BTreeMap;

use crate::entities::{EventRecord, LogStreamMessage};

/// Consumer-side view of the log that merges the live stream with backfill
/// pages. Records are keyed by id, so whichever path delivers a record
/// first wins and the other is ignored.
#[derive(Debug, Default, Clone)]
pub struct LogTimeline {
    records: BTreeMap<i64, EventRecord>,
}

impl LogTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the message added a record not seen before.
    /// The hello sentinel never adds anything.
    pub fn apply_live(&mut self, message: LogStreamMessage) -> bool {
        match message {
            LogStreamMessage::Hello(_) => false,
            LogStreamMessage::Record(record) => self.insert(record),
        }
    }

    /// Merges a backfill page; returns the number of new records.
    pub fn apply_backfill(&mut self, page: Vec<EventRecord>) -> usize {
        page.into_iter().filter(|record| self.insert(record.clone())).count()
    }

    fn insert(&mut self, record: EventRecord) -> bool {
        if self.records.contains_key(&record.id) {
            return false;
        }
        self.records.insert(record.id, record);
        true
    }

    /// Smallest id held; the cursor for the next backward page.
    pub fn cursor(&self) -> Option<i64> {
        self.records.keys().next().copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.records.contains_key(&id)
    }

    pub fn ids_newest_first(&self) -> Vec<i64> {
        self.records.keys().rev().copied().collect()
    }

    pub fn newest_first(&self) -> impl Iterator<Item = &EventRecord> {
        self.records.values().rev()
    }
}
