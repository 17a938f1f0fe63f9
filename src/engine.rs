//! Engine Module
//!
//! The event store that coordinates all storage components.
//!
//! ## Responsibilities
//! - Own the active file and rotate it when oversized
//! - Rebuild per-file indexes on startup
//! - Prune, scan and filter files for queries
//! - Schedule and flush deferred delivery marks

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, error, info, warn, Span};

use crate::config::Config;
use crate::error::{InboxError, Result};
use crate::event::{now_millis, EventEntry, EventFilter, EventUpdate};
use crate::storage::{file, FileIndex, FileLockManager, FileUpdates, PendingUpdateManager};

/// Persistent, indexed event store for one node
///
/// ## Concurrency Model
///
/// Every method takes `&self`; share the store behind an `Arc`.
///
/// - **Appends** (store_event): serialized by `current_file`, which also
///   guards rotation. The append then takes the active file's lock from
///   `lock_manager` for its read-modify-write.
///   Lock order: current_file → file lock → file_indexes (never reversed).
///
/// - **Queries** (load_events): candidate selection holds the shared side of
///   `file_indexes`; file content is read without any lock (files are
///   replaced by rename, so a reader never sees a torn document).
///
/// - **Flushes** (apply_pending_updates): per-file lock only, so flushing one
///   file never blocks appends to another.
///
/// - `file_indexes` is write-locked only for the map mutation itself, never
///   across file I/O.
pub struct EventStorage {
    /// Directory holding the event files
    base_dir: PathBuf,

    /// `rank<R>_events_`
    file_prefix: String,

    /// Rotation threshold (bytes on disk)
    max_file_size: u64,

    /// Path of the active file; the mutex serializes appends and rotation
    current_file: Mutex<PathBuf>,

    /// Conservative per-file summaries
    file_indexes: RwLock<HashMap<PathBuf, FileIndex>>,

    /// Delivery marks awaiting flush
    pending_updates: PendingUpdateManager,

    /// Per-file read-modify-write locks
    lock_manager: FileLockManager,

    /// Injected logging context
    span: Span,
}

impl EventStorage {
    /// Open or create a store with the given config
    ///
    /// On startup:
    /// 1. Create the base directory if missing
    /// 2. Index every file of this node (unparseable files are skipped)
    /// 3. Create a fresh active file
    ///
    /// Fails if the directory cannot be created or listed.
    pub fn open(config: Config) -> Result<Self> {
        let span = config.span.clone().unwrap_or_else(|| {
            tracing::info_span!(
                "event_storage",
                rank = %config.node_rank,
                dir = %config.base_dir.display()
            )
        });
        let _enter = span.enter();

        let base_dir = config.base_dir.clone();
        let file_prefix = config.file_prefix();
        let max_file_size = config.effective_max_file_size();

        // Step 1: Create base directory
        fs::create_dir_all(&base_dir)?;

        // Step 2: Rebuild indexes
        let file_indexes = Self::scan_directory(&base_dir, &file_prefix)?;

        // Step 3: Start a new active file
        let current_file = Self::create_event_file(&base_dir, &file_prefix)?;

        info!(
            indexed_files = file_indexes.len(),
            active = %current_file.display(),
            max_file_size,
            "Event storage opened"
        );

        drop(_enter);
        Ok(Self {
            base_dir,
            file_prefix,
            max_file_size,
            current_file: Mutex::new(current_file),
            file_indexes: RwLock::new(file_indexes),
            pending_updates: PendingUpdateManager::new(),
            lock_manager: FileLockManager::new(),
            span,
        })
    }

    /// Open with a directory (convenience method)
    ///
    /// Uses default config with the specified base directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().base_dir(path).build())
    }

    /// Append an event to the active file
    ///
    /// Unset id, timestamp and type are defaulted first. If the active file
    /// is already above `max_file_size` it is rotated once; a freshly
    /// rotated file that is still oversized is an error.
    ///
    /// Returns the path of the file the event landed in.
    pub fn store_event(&self, mut event: EventEntry) -> Result<PathBuf> {
        let _enter = self.span.enter();

        event.apply_defaults();

        let mut current = self.current_file.lock();
        let mut rotated = false;

        loop {
            let file_lock = self.lock_manager.get_lock(&current);
            let guard = file_lock.lock();

            // Step 1: Read and parse the active file
            let mut loaded = file::read(&current)?;

            // Step 2: Rotate if the file is already oversized
            if loaded.size > self.max_file_size {
                drop(guard);
                if rotated {
                    return Err(InboxError::Rotation(format!(
                        "new file {} is {} bytes, above the {} byte limit",
                        current.display(),
                        loaded.size,
                        self.max_file_size
                    )));
                }
                *current = self.rotate(&current, loaded.size)?;
                rotated = true;
                continue;
            }

            // Step 3: Append and overwrite
            loaded.events.push(event);
            file::write(&current, &loaded.events)?;
            drop(guard);

            // Step 4: Widen the index
            if let Some(stored) = loaded.events.last() {
                self.update_file_index(&current, stored);
                debug!(id = %stored.id, file = %current.display(), "Stored event");
            }

            return Ok(current.clone());
        }
    }

    /// Query events matching `filter`, newest first
    ///
    /// Every returned event is scheduled to be marked delivered; the marks
    /// are flushed to disk before this call returns. Returned entries carry
    /// the `processed` state they had on disk.
    ///
    /// Unreadable candidate files and failed flushes are logged and skipped;
    /// a candidate file that no longer exists loses its index.
    pub fn load_events(&self, filter: &EventFilter) -> Result<Vec<EventEntry>> {
        let _enter = self.span.enter();

        let now = now_millis();
        let filter = filter.resolved(now);

        // Step 1: Prune with the index
        let candidates = self.candidate_files(&filter);

        // Step 2 + 3: Filter each candidate, scheduling delivery marks
        let mut events = Vec::new();
        for path in &candidates {
            match self.load_file(path, &filter, now) {
                Ok(matched) => events.extend(matched),
                Err(InboxError::Io(ref e)) if e.kind() == io::ErrorKind::NotFound => {
                    debug!(file = %path.display(), "Event file vanished, dropping its index");
                    self.file_indexes.write().remove(path);
                }
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "Failed to load event file");
                }
            }
        }

        // Step 4: Newest first
        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        debug!(
            candidates = candidates.len(),
            matched = events.len(),
            "Loaded events"
        );

        // Step 5: Flush delivery marks
        self.apply_pending_updates();

        Ok(events)
    }

    /// Flush every buffered delivery mark to disk
    ///
    /// Files are flushed independently: a failure is logged, its updates are
    /// requeued for the next flush, and the remaining files still flush.
    /// Updates for a file that no longer exists are dropped.
    ///
    /// Returns the number of files rewritten.
    pub fn apply_pending_updates(&self) -> usize {
        let _enter = self.span.enter();

        let drained = self.pending_updates.drain_all();
        let mut flushed = 0;

        for (path, updates) in drained {
            if updates.is_empty() {
                continue;
            }

            match self.apply_single_file_updates(&path, &updates) {
                Ok(true) => flushed += 1,
                Ok(false) => {
                    debug!(file = %path.display(), "No pending ids found in file");
                }
                Err(InboxError::Io(ref e)) if e.kind() == io::ErrorKind::NotFound => {
                    debug!(file = %path.display(), "Event file vanished, dropping its updates");
                    self.file_indexes.write().remove(&path);
                }
                Err(e) => {
                    error!(file = %path.display(), error = %e, "Failed to apply file updates");
                    self.pending_updates.requeue(&path, updates);
                }
            }
        }

        flushed
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the base directory path
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Get the file name prefix of this node
    pub fn file_prefix(&self) -> &str {
        &self.file_prefix
    }

    /// Get the rotation threshold in bytes
    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Get the path of the active file
    pub fn current_file(&self) -> PathBuf {
        self.current_file.lock().clone()
    }

    /// Get the number of indexed files
    pub fn indexed_file_count(&self) -> usize {
        self.file_indexes.read().len()
    }

    /// Get a copy of one file's index
    pub fn file_index(&self, path: &Path) -> Option<FileIndex> {
        self.file_indexes.read().get(path).cloned()
    }

    /// Get the number of buffered delivery marks
    pub fn pending_update_count(&self) -> usize {
        self.pending_updates.len()
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Index every event file of this node in `dir`
    fn scan_directory(dir: &Path, prefix: &str) -> Result<HashMap<PathBuf, FileIndex>> {
        let mut indexes = HashMap::new();

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() || !file::is_event_file(&path, prefix) {
                continue;
            }

            match file::read(&path) {
                Ok(loaded) => {
                    if let Some(index) = FileIndex::from_events(&path, &loaded.events) {
                        indexes.insert(path, index);
                    }
                }
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "Indexing failed, skipping file");
                }
            }
        }

        Ok(indexes)
    }

    /// Create a new empty event file in `dir`
    fn create_event_file(dir: &Path, prefix: &str) -> Result<PathBuf> {
        let path = dir.join(file::new_file_name(prefix));
        file::create_empty(&path)?;
        Ok(path)
    }

    /// Replace the active file (called with `current_file` held)
    fn rotate(&self, old: &Path, old_size: u64) -> Result<PathBuf> {
        let path = Self::create_event_file(&self.base_dir, &self.file_prefix)?;
        info!(
            from = %old.display(),
            to = %path.display(),
            size = old_size,
            "Rotated event file"
        );
        Ok(path)
    }

    fn update_file_index(&self, path: &Path, event: &EventEntry) {
        let mut indexes = self.file_indexes.write();
        indexes
            .entry(path.to_path_buf())
            .and_modify(|index| index.record_append(event))
            .or_insert_with(|| FileIndex::from_append(path, event));
    }

    fn replace_file_index(&self, path: &Path, events: &[EventEntry]) {
        let index = FileIndex::from_events(path, events);
        let mut indexes = self.file_indexes.write();
        match index {
            Some(index) => {
                indexes.insert(path.to_path_buf(), index);
            }
            None => {
                indexes.remove(path);
            }
        }
    }

    /// Files whose index cannot rule out a match
    fn candidate_files(&self, filter: &EventFilter) -> Vec<PathBuf> {
        let indexes = self.file_indexes.read();
        indexes
            .values()
            .filter(|index| index.may_match(filter))
            .map(|index| index.path.clone())
            .collect()
    }

    fn load_file(&self, path: &Path, filter: &EventFilter, now: i64) -> Result<Vec<EventEntry>> {
        let loaded = file::read(path)?;

        let matched: Vec<EventEntry> = loaded
            .events
            .into_iter()
            .filter(|event| filter.matches(event))
            .collect();

        // Deferred: applied by apply_pending_updates
        for event in &matched {
            self.pending_updates
                .add_update(path, &event.id, EventUpdate::delivered(now));
        }

        Ok(matched)
    }

    /// Apply one file's updates under its lock; `Ok(false)` if no id matched
    fn apply_single_file_updates(&self, path: &Path, updates: &FileUpdates) -> Result<bool> {
        let file_lock = self.lock_manager.get_lock(path);
        let _guard = file_lock.lock();

        let mut loaded = file::read(path)?;

        let mut updated = false;
        for event in loaded.events.iter_mut() {
            if let Some(update) = updates.get(&event.id) {
                event.apply_update(update);
                updated = true;
            }
        }

        if !updated {
            return Ok(false);
        }

        file::write(path, &loaded.events)?;
        self.replace_file_index(path, &loaded.events);

        Ok(true)
    }
}
