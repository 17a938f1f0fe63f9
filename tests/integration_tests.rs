//! Integration tests for traceinbox
//!
//! Full agent lifecycle: ingest, query, deliver, restart.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tempfile::TempDir;
use traceinbox::config::Config;
use traceinbox::event::{EventEntry, EventFilter};
use traceinbox::network::{Client, Server};
use traceinbox::service::{GetAlertsRequest, SendEventRequest};
use traceinbox::{AlertService, EventStorage};

fn config_for(dir: &TempDir) -> Config {
    Config::builder()
        .base_dir(dir.path())
        .node_rank("3")
        .max_file_size(1_024)
        .listen_addr("127.0.0.1:0")
        .build()
}

#[test]
fn test_agent_lifecycle_survives_restart() {
    let dir = TempDir::new().unwrap();

    // First agent run: ingest over TCP and drain the inbox once
    {
        let storage = Arc::new(EventStorage::open(config_for(&dir)).unwrap());
        let server = Arc::new(
            Server::bind(config_for(&dir), AlertService::new(Arc::clone(&storage))).unwrap(),
        );
        let addr = server.local_addr().unwrap().to_string();
        let handle = {
            let server = Arc::clone(&server);
            thread::spawn(move || server.run().unwrap())
        };

        let mut client = Client::connect(&addr, Duration::from_secs(5)).unwrap();
        for i in 0..20 {
            client
                .send_event(SendEventRequest::text(format!("alert {}", i)))
                .unwrap();
        }

        let drained = client
            .get_alerts(GetAlertsRequest {
                unprocessed: true,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(drained.len(), 20);
        assert_eq!(storage.pending_update_count(), 0);
        assert!(storage.indexed_file_count() > 1, "small files should rotate");

        server.shutdown();
        handle.join().unwrap();
    }

    // Second run: everything is still there and still marked delivered
    let storage = EventStorage::open(config_for(&dir)).unwrap();
    storage
        .store_event(EventEntry::new("after restart").with_source("system"))
        .unwrap();

    // Only the post-restart event is still undelivered
    let fresh = storage
        .load_events(&EventFilter::new().unprocessed(true))
        .unwrap();
    assert_eq!(fresh.len(), 1);
    assert_eq!(fresh[0].message, "after restart");

    let all = storage.load_events(&EventFilter::new()).unwrap();
    assert_eq!(all.len(), 21);
    assert!(all.iter().all(|e| e.processed));

    for entry in std::fs::read_dir(dir.path()).unwrap() {
        let name = entry.unwrap().file_name().into_string().unwrap();
        assert!(name.starts_with("rank3_events_"), "unexpected file {}", name);
    }
}
