//! Pending Update Manager
//!
//! Buffers "mark as delivered" mutations so the read path never writes
//! synchronously.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::event::EventUpdate;

/// Updates for one file, keyed by event id
pub type FileUpdates = HashMap<String, EventUpdate>;

/// Buffered delivery mutations, file path → event id → update
///
/// Transient: anything not yet flushed is lost on crash, which leaves the
/// events undelivered and due for redelivery.
#[derive(Debug, Default)]
pub struct PendingUpdateManager {
    updates: Mutex<HashMap<PathBuf, FileUpdates>>,
}

impl PendingUpdateManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an update; last write wins per (file, id)
    pub fn add_update(&self, path: &Path, event_id: &str, update: EventUpdate) {
        let mut updates = self.updates.lock();
        updates
            .entry(path.to_path_buf())
            .or_default()
            .insert(event_id.to_string(), update);
    }

    /// Take every buffered update, leaving the manager empty
    ///
    /// Concurrent flushers each get a disjoint set, so no update is applied
    /// twice.
    pub fn drain_all(&self) -> HashMap<PathBuf, FileUpdates> {
        std::mem::take(&mut *self.updates.lock())
    }

    /// Put back updates whose flush failed
    ///
    /// An update recorded for the same (file, id) after the drain is newer and
    /// is kept.
    pub fn requeue(&self, path: &Path, file_updates: FileUpdates) {
        let mut updates = self.updates.lock();
        let pending = updates.entry(path.to_path_buf()).or_default();
        for (event_id, update) in file_updates {
            pending.entry(event_id).or_insert(update);
        }
    }

    /// Updates buffered for one file
    pub fn pending_for(&self, path: &Path) -> Option<FileUpdates> {
        self.updates.lock().get(path).cloned()
    }

    /// Total number of buffered (file, id) updates
    pub fn len(&self) -> usize {
        self.updates.lock().values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
