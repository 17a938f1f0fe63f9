//! Service Module
//!
//! Translates wire requests into store calls and store results into wire
//! responses.
//!
//! ## Endpoints
//! - Webhook ingest: `SendEventRequest` → `EventStorage::store_event`
//! - Alert query: `GetAlertsRequest` → `EventStorage::load_events`
//! - Ping

mod types;

pub use types::{
    AlertRecord, Content, GetAlertsRequest, GetAlertsResponse, SendEventRequest,
    SendEventResponse,
};

use std::sync::Arc;

use serde::Serialize;

use crate::engine::EventStorage;
use crate::error::Result;
use crate::event::{now_millis, EventEntry, EventFilter, DEFAULT_EVENT_TYPE};
use crate::protocol::{Command, Response};

/// Source recorded for webhook-delivered alerts
pub const WEBHOOK_SOURCE: &str = "training";

/// Request handlers in front of the event store
#[derive(Clone)]
pub struct AlertService {
    storage: Arc<EventStorage>,
}

impl AlertService {
    pub fn new(storage: Arc<EventStorage>) -> Self {
        Self { storage }
    }

    /// Store a webhook-delivered training alert
    ///
    /// Webhooks carry no severity, so alerts are stored at severity 0.
    pub fn handle_webhook(&self, request: SendEventRequest) -> Result<SendEventResponse> {
        let entry = EventEntry::new(request.content.text)
            .with_source(WEBHOOK_SOURCE)
            .with_type(DEFAULT_EVENT_TYPE)
            .with_severity(0);

        let path = self.storage.store_event(entry)?;
        tracing::debug!(file = %path.display(), "Webhook alert stored");

        Ok(SendEventResponse::success())
    }

    /// Query alerts, newest first
    pub fn get_alerts(&self, request: GetAlertsRequest) -> Result<GetAlertsResponse> {
        let filter = Self::alert_filter(&request, now_millis());
        let events = self.storage.load_events(&filter)?;

        Ok(GetAlertsResponse {
            alerts: events.into_iter().map(AlertRecord::from).collect(),
        })
    }

    /// Map an alert query onto a store filter
    pub fn alert_filter(request: &GetAlertsRequest, now: i64) -> EventFilter {
        EventFilter::new()
            .time_range(request.start_time.unwrap_or(0), request.end_time.unwrap_or(now))
            .min_severity(request.min_severity)
            .event_type(DEFAULT_EVENT_TYPE)
            .unprocessed(request.unprocessed)
    }

    /// Execute a command and return a response
    pub fn execute(&self, command: Command) -> Response {
        match command {
            Command::SendEvent(request) => to_response(self.handle_webhook(request)),
            Command::GetAlerts(request) => to_response(self.get_alerts(request)),
            Command::Ping => Response::ok(Some(b"PONG".to_vec())),
        }
    }

    /// Get the underlying store
    pub fn storage(&self) -> &Arc<EventStorage> {
        &self.storage
    }
}

fn to_response<T: Serialize>(result: Result<T>) -> Response {
    match result.and_then(|body| Ok(serde_json::to_vec(&body)?)) {
        Ok(payload) => Response::ok(Some(payload)),
        Err(e) => {
            tracing::error!(error = %e, "Request failed");
            Response::error(&e.to_string())
        }
    }
}
