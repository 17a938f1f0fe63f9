//! End-to-end tests over TCP
//!
//! A real server on an ephemeral port, driven by the blocking client.

use std::io::Write;
use std::net::TcpStream;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tempfile::TempDir;
use traceinbox::config::Config;
use traceinbox::network::{Client, Server};
use traceinbox::protocol::{read_response, Status};
use traceinbox::service::{GetAlertsRequest, SendEventRequest};
use traceinbox::{AlertService, EventStorage, InboxError};

// =============================================================================
// Helper Functions
// =============================================================================

struct TestServer {
    _temp: TempDir,
    server: Arc<Server>,
    addr: String,
    handle: Option<thread::JoinHandle<()>>,
}

impl TestServer {
    fn start() -> Self {
        let temp = TempDir::new().unwrap();
        let config = Config::builder()
            .base_dir(temp.path())
            .listen_addr("127.0.0.1:0")
            .build();
        let storage = Arc::new(EventStorage::open(config.clone()).unwrap());
        let server = Arc::new(Server::bind(config, AlertService::new(storage)).unwrap());
        let addr = server.local_addr().unwrap().to_string();

        let handle = {
            let server = Arc::clone(&server);
            thread::spawn(move || server.run().unwrap())
        };

        Self {
            _temp: temp,
            server,
            addr,
            handle: Some(handle),
        }
    }

    fn client(&self) -> Client {
        Client::connect(&self.addr, Duration::from_secs(5)).unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.server.shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[test]
fn test_ping() {
    let server = TestServer::start();
    server.client().ping().unwrap();
}

#[test]
fn test_send_then_query_over_tcp() {
    let server = TestServer::start();
    let mut client = server.client();

    client.send_event(SendEventRequest::text("first")).unwrap();
    client.send_event(SendEventRequest::text("second")).unwrap();

    let alerts = client.get_alerts(GetAlertsRequest::default()).unwrap();
    let messages: Vec<&str> = alerts.iter().map(|a| a.message.as_str()).collect();

    assert_eq!(messages.len(), 2);
    assert!(messages.contains(&"first"));
    assert!(messages.contains(&"second"));
}

#[test]
fn test_unprocessed_delivery_across_clients() {
    let server = TestServer::start();
    server.client().send_event(SendEventRequest::text("x")).unwrap();

    let request = GetAlertsRequest {
        unprocessed: true,
        ..Default::default()
    };

    assert_eq!(server.client().get_alerts(request.clone()).unwrap().len(), 1);
    assert!(server.client().get_alerts(request).unwrap().is_empty());
}

#[test]
fn test_bad_payload_keeps_connection_open() {
    let server = TestServer::start();
    let mut stream = TcpStream::connect(&server.addr).unwrap();
    stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();

    let payload = b"not json";
    let mut frame = vec![0x01];
    frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    frame.extend_from_slice(payload);
    stream.write_all(&frame).unwrap();

    let response = read_response(&mut stream).unwrap();
    assert_eq!(response.status, Status::BadRequest);

    // Same connection still serves requests
    stream.write_all(&[0x03, 0, 0, 0, 0]).unwrap();
    let response = read_response(&mut stream).unwrap();
    assert_eq!(response.status, Status::Ok);
}

#[test]
fn test_concurrent_clients() {
    let server = TestServer::start();

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let addr = server.addr.clone();
            thread::spawn(move || {
                let mut client = Client::connect(&addr, Duration::from_secs(5)).unwrap();
                for i in 0..10 {
                    client
                        .send_event(SendEventRequest::text(format!("t{} e{}", t, i)))
                        .unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let alerts = server.client().get_alerts(GetAlertsRequest::default()).unwrap();
    assert_eq!(alerts.len(), 40);
}

#[test]
fn test_zero_connection_limit_is_rejected() {
    let temp = TempDir::new().unwrap();
    let config = Config::builder()
        .base_dir(temp.path())
        .listen_addr("127.0.0.1:0")
        .max_connections(0)
        .build();
    let storage = Arc::new(EventStorage::open(config.clone()).unwrap());

    let result = Server::bind(config, AlertService::new(storage));
    assert!(matches!(result, Err(InboxError::Config(_))));
}
