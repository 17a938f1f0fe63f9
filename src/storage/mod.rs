//! Storage Module
//!
//! Building blocks of the persistent event store.
//!
//! ## Responsibilities
//! - Per-file locking for read-modify-write cycles
//! - Buffering of deferred delivery marks
//! - Per-file summaries for pruning queries
//! - The JSON event file format
//!
//! ## File Format
//! ```text
//! ┌────────────────────────────────────────┐
//! │ {"events": [                           │
//! │   { EventEntry },                      │
//! │   { EventEntry },                      │
//! │   ...                                  │
//! │ ]}                (pretty-printed)     │
//! └────────────────────────────────────────┘
//! ```
//! No index is persisted; it is rebuilt from the files at startup.

pub mod file;
mod index;
mod lock_manager;
mod pending;

pub use index::FileIndex;
pub use lock_manager::FileLockManager;
pub use pending::{FileUpdates, PendingUpdateManager};
