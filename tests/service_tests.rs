//! Tests for AlertService
//!
//! These tests verify:
//! - Webhook ingest maps onto a training alert
//! - Alert queries map onto an alert-only filter and wire records
//! - Command execution produces the right responses

use std::sync::Arc;

use tempfile::TempDir;
use traceinbox::event::{now_millis, EventEntry, EventFilter};
use traceinbox::protocol::{Command, Status};
use traceinbox::service::{
    AlertRecord, GetAlertsRequest, GetAlertsResponse, SendEventRequest, SendEventResponse,
    WEBHOOK_SOURCE,
};
use traceinbox::{AlertService, EventStorage};

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_service() -> (TempDir, AlertService) {
    let temp_dir = TempDir::new().unwrap();
    let storage = EventStorage::open_path(temp_dir.path()).unwrap();
    (temp_dir, AlertService::new(Arc::new(storage)))
}

// =============================================================================
// Webhook Tests
// =============================================================================

#[test]
fn test_webhook_stores_training_alert() {
    let (_temp, service) = setup_service();

    let response = service
        .handle_webhook(SendEventRequest::text("loss spike"))
        .unwrap();
    assert_eq!(response, SendEventResponse::success());

    let events = service
        .storage()
        .load_events(&EventFilter::new())
        .unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].message, "loss spike");
    assert_eq!(events[0].source, WEBHOOK_SOURCE);
    assert_eq!(events[0].event_type, "alert");
    assert_eq!(events[0].severity, 0);
}

// =============================================================================
// Alert Query Tests
// =============================================================================

#[test]
fn test_alert_filter_mapping() {
    let request = GetAlertsRequest {
        start_time: None,
        end_time: None,
        min_severity: 2,
        unprocessed: true,
    };

    let filter = AlertService::alert_filter(&request, 12_345);

    assert_eq!(filter.start_time, 0);
    assert_eq!(filter.end_time, 12_345);
    assert_eq!(filter.min_severity, 2);
    assert_eq!(filter.event_type.as_deref(), Some("alert"));
    assert!(filter.unprocessed);
    assert_eq!(filter.source, None);
}

#[test]
fn test_get_alerts_returns_only_alerts() {
    let (_temp, service) = setup_service();
    let storage = service.storage();

    storage.store_event(EventEntry::new("a1").with_timestamp(10).with_severity(1)).unwrap();
    storage.store_event(EventEntry::new("audit").with_timestamp(20).with_type("audit")).unwrap();
    storage.store_event(EventEntry::new("a2").with_timestamp(30).with_severity(3)).unwrap();

    let response = service.get_alerts(GetAlertsRequest::default()).unwrap();

    assert_eq!(
        response.alerts,
        vec![
            AlertRecord { message: "a2".into(), timestamp: 30, severity: 3 },
            AlertRecord { message: "a1".into(), timestamp: 10, severity: 1 },
        ]
    );
}

#[test]
fn test_get_alerts_time_range_and_severity() {
    let (_temp, service) = setup_service();
    let storage = service.storage();
    let now = now_millis();

    storage.store_event(EventEntry::new("old").with_timestamp(now - 5_000).with_severity(2)).unwrap();
    storage.store_event(EventEntry::new("new").with_timestamp(now - 1_000).with_severity(2)).unwrap();
    storage.store_event(EventEntry::new("minor").with_timestamp(now - 1_000).with_severity(0)).unwrap();

    let response = service
        .get_alerts(GetAlertsRequest {
            start_time: Some(now - 2_000),
            end_time: Some(now),
            min_severity: 1,
            unprocessed: false,
        })
        .unwrap();

    let messages: Vec<&str> = response.alerts.iter().map(|a| a.message.as_str()).collect();
    assert_eq!(messages, vec!["new"]);
}

#[test]
fn test_get_alerts_unprocessed_drains() {
    let (_temp, service) = setup_service();
    service.handle_webhook(SendEventRequest::text("x")).unwrap();

    let request = GetAlertsRequest {
        unprocessed: true,
        ..Default::default()
    };

    assert_eq!(service.get_alerts(request.clone()).unwrap().alerts.len(), 1);
    assert!(service.get_alerts(request).unwrap().alerts.is_empty());
    assert_eq!(service.get_alerts(GetAlertsRequest::default()).unwrap().alerts.len(), 1);
}

// =============================================================================
// Execute Tests
// =============================================================================

#[test]
fn test_execute_ping() {
    let (_temp, service) = setup_service();

    let response = service.execute(Command::Ping);

    assert_eq!(response.status, Status::Ok);
    assert_eq!(response.payload.as_deref(), Some(b"PONG".as_slice()));
}

#[test]
fn test_execute_send_then_get() {
    let (_temp, service) = setup_service();

    let sent = service.execute(Command::SendEvent(SendEventRequest::text("hang suspected")));
    let body: SendEventResponse = sent.json().unwrap();
    assert_eq!(body.status, "success");

    let got = service.execute(Command::GetAlerts(GetAlertsRequest::default()));
    let body: GetAlertsResponse = got.json().unwrap();
    assert_eq!(body.alerts.len(), 1);
    assert_eq!(body.alerts[0].message, "hang suspected");
}
