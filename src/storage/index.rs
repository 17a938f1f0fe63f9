//! File Index
//!
//! In-memory summary of one event file, used to skip files before opening
//! them.
//!
//! ## Invariant
//! The summary may be looser than the file (an extra file gets opened) but
//! never tighter (a matching event would be silently dropped). Appends only
//! widen it; a full rebuild after a flush resets it to the exact contents.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::event::{EventEntry, EventFilter};

/// Conservative summary of an event file's contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileIndex {
    pub path: PathBuf,
    pub min_time: i64,
    pub max_time: i64,
    pub max_severity: i32,
    pub event_types: HashSet<String>,
    /// True iff every event in the file is marked processed
    pub all_processed: bool,
}

impl FileIndex {
    /// Index for a file whose only known event is `event`
    pub fn from_entry(path: &Path, event: &EventEntry) -> Self {
        Self {
            path: path.to_path_buf(),
            min_time: event.timestamp,
            max_time: event.timestamp,
            max_severity: event.severity,
            event_types: HashSet::from([event.event_type.clone()]),
            all_processed: event.processed,
        }
    }

    /// Index for a previously unindexed file that just received `event`
    pub fn from_append(path: &Path, event: &EventEntry) -> Self {
        let mut index = Self::from_entry(path, event);
        index.all_processed = false;
        index
    }

    /// Exact index of a file's full contents; `None` for an empty file
    pub fn from_events(path: &Path, events: &[EventEntry]) -> Option<Self> {
        let (first, rest) = events.split_first()?;

        let mut index = Self::from_entry(path, first);
        for event in rest {
            index.widen(event);
            index.all_processed &= event.processed;
        }
        Some(index)
    }

    /// Account for a freshly appended event
    ///
    /// A new event has never been delivered, so the file can no longer be
    /// all-processed.
    pub fn record_append(&mut self, event: &EventEntry) {
        self.widen(event);
        self.all_processed = false;
    }

    fn widen(&mut self, event: &EventEntry) {
        self.min_time = self.min_time.min(event.timestamp);
        self.max_time = self.max_time.max(event.timestamp);
        self.max_severity = self.max_severity.max(event.severity);
        if !self.event_types.contains(&event.event_type) {
            self.event_types.insert(event.event_type.clone());
        }
    }

    /// False only if no event in the file can satisfy `filter`
    ///
    /// `filter` must already have its end time resolved.
    pub fn may_match(&self, filter: &EventFilter) -> bool {
        if self.max_time < filter.start_time || self.min_time > filter.end_time {
            return false;
        }
        if self.max_severity < filter.min_severity {
            return false;
        }
        if let Some(t) = filter.type_criterion() {
            if !self.event_types.contains(t) {
                return false;
            }
        }
        !(filter.unprocessed && self.all_processed)
    }
}
