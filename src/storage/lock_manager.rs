//! File Lock Manager
//!
//! One lazily created mutex per event file path.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

/// Hands out one exclusive lock per backing file
///
/// ## Concurrency:
/// - `locks`: the table's own mutex, held only while looking up or inserting
/// - The per-file mutexes are shared by reference (`Arc`) with every caller
///   operating on the same path, and live as long as the manager
#[derive(Debug, Default)]
pub struct FileLockManager {
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl FileLockManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the lock for `path`, creating it on first use
    ///
    /// Every call for the same path returns the same mutex.
    pub fn get_lock(&self, path: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock();
        Arc::clone(
            locks
                .entry(path.to_path_buf())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    /// Number of paths a lock has been handed out for
    pub fn lock_count(&self) -> usize {
        self.locks.lock().len()
    }
}
