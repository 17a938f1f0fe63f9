//! Wire request/response shapes
//!
//! Carried as JSON payloads by the protocol frames.

use serde::{Deserialize, Serialize};

use crate::event::EventEntry;

/// Body of an inbound training-alert webhook
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SendEventRequest {
    #[serde(default)]
    pub msg_type: String,
    pub content: Content,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub text: String,
}

impl SendEventRequest {
    /// A plain-text webhook message
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            msg_type: "text".to_string(),
            content: Content { text: text.into() },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendEventResponse {
    pub status: String,
}

impl SendEventResponse {
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
        }
    }
}

/// Alert query; times are milliseconds since the epoch
///
/// A missing start means the beginning of time, a missing end means now.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetAlertsRequest {
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub min_severity: i32,
    /// Only alerts not returned by an earlier query
    pub unprocessed: bool,
}

/// One alert as seen by a querying client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub message: String,
    pub timestamp: i64,
    pub severity: i32,
}

impl From<EventEntry> for AlertRecord {
    fn from(event: EventEntry) -> Self {
        Self {
            message: event.message,
            timestamp: event.timestamp,
            severity: event.severity,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetAlertsResponse {
    pub alerts: Vec<AlertRecord>,
}
