//! Event entry
//!
//! One durable record in an event file.

use serde::{Deserialize, Serialize};

use super::metadata::{deserialize_metadata, MetaValue, Metadata};
use super::{new_event_id, now_millis};

/// Type assigned to events stored without one
pub const DEFAULT_EVENT_TYPE: &str = "alert";

/// A generic event record
///
/// `processed` / `processed_at` track delivery and are only ever written by
/// the store; whatever a producer puts there is kept as-is on append.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventEntry {
    /// Unique event id, generated when empty
    pub id: String,

    /// Event source ("training", "system")
    pub source: String,

    /// Event type ("alert", "audit", "metric")
    #[serde(rename = "type")]
    pub event_type: String,

    /// Associated training job
    pub job_id: String,

    pub message: String,

    /// Milliseconds since the Unix epoch
    pub timestamp: i64,

    /// Higher is more severe
    pub severity: i32,

    #[serde(deserialize_with = "deserialize_metadata")]
    pub metadata: Metadata,

    pub processed: bool,

    /// Delivery time in milliseconds, zero while undelivered
    pub processed_at: i64,
}

impl EventEntry {
    /// Create an entry carrying only a message; everything else defaults on store
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    pub fn with_job_id(mut self, job_id: impl Into<String>) -> Self {
        self.job_id = job_id.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_severity(mut self, severity: i32) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Fill in id, timestamp and type when the producer left them unset
    pub fn apply_defaults(&mut self) {
        if self.id.is_empty() {
            self.id = new_event_id();
        }
        if self.timestamp == 0 {
            self.timestamp = now_millis();
        }
        if self.event_type.is_empty() {
            self.event_type = DEFAULT_EVENT_TYPE.to_string();
        }
    }

    /// Apply a delivery-tracking mutation
    pub fn apply_update(&mut self, update: &EventUpdate) {
        self.processed = update.processed;
        self.processed_at = update.processed_at;
    }
}

/// A buffered delivery-tracking mutation for one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventUpdate {
    pub processed: bool,
    pub processed_at: i64,
}

impl EventUpdate {
    /// Mark as delivered at `at` (milliseconds)
    pub fn delivered(at: i64) -> Self {
        Self {
            processed: true,
            processed_at: at,
        }
    }
}
