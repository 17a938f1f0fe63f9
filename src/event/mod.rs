//! Event Module
//!
//! The records the store persists and the predicates used to query them.
//!
//! ## On-disk shape
//! ```text
//! {
//!   "events": [
//!     { "id": "…", "source": "training", "type": "alert", "job_id": "",
//!       "message": "…", "timestamp": 1714550400000, "severity": 1,
//!       "metadata": {}, "processed": false, "processed_at": 0 }
//!   ]
//! }
//! ```

mod entry;
mod filter;
mod metadata;

pub use entry::{EventEntry, EventUpdate, DEFAULT_EVENT_TYPE};
pub use filter::EventFilter;
pub use metadata::{MetaValue, Metadata};

/// Current wall-clock time in milliseconds since the Unix epoch
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Fresh collision-resistant event id
pub fn new_event_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
