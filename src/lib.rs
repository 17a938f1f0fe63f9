//! # traceinbox
//!
//! The per-node diagnostic agent's alert/event inbox:
//! - Durable JSON event files with size-based rotation
//! - Per-file index for pruning queries without a full scan
//! - Deferred, at-least-once delivery tracking
//! - Framed TCP protocol for webhook ingest and alert queries
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │            (webhook ingest, alert queries, ping)             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    AlertService                              │
//! │          (wire request ↔ EventEntry / EventFilter)           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    EventStorage                              │
//! │         (active file, rotation, query, flush)                │
//! └───────┬──────────────────┬──────────────────┬───────────────┘
//!         │                  │                  │
//!         ▼                  ▼                  ▼
//!  ┌─────────────┐   ┌──────────────┐   ┌──────────────┐
//!  │  FileIndex  │   │   Pending    │   │  FileLock    │
//!  │  (RwLock)   │   │   Updates    │   │  Manager     │
//!  └─────────────┘   └──────────────┘   └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod logging;

pub mod event;
pub mod storage;
pub mod engine;
pub mod service;
pub mod protocol;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{InboxError, Result};
pub use config::Config;
pub use engine::EventStorage;
pub use event::{EventEntry, EventFilter, MetaValue, Metadata};
pub use service::AlertService;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of traceinbox
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
