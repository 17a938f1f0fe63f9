//! Codec Tests
//!
//! Tests for command and response encoding/decoding.

use std::io::Cursor;

use traceinbox::protocol::{
    Command, Response, Status,
    encode_command, decode_command,
    encode_response, decode_response,
    read_command, write_command,
    read_response, write_response,
    HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
use traceinbox::service::{GetAlertsRequest, SendEventRequest};
use traceinbox::InboxError;

// =============================================================================
// Command Encoding/Decoding Tests
// =============================================================================

#[test]
fn test_encode_decode_send_event() {
    let cmd = Command::SendEvent(SendEventRequest::text("NCCL timeout on rank 5"));
    let encoded = encode_command(&cmd).unwrap();

    assert_eq!(encoded[0], 0x01);
    assert_eq!(decode_command(&encoded).unwrap(), cmd);
}

#[test]
fn test_encode_decode_get_alerts() {
    let cmd = Command::GetAlerts(GetAlertsRequest {
        start_time: Some(1_000),
        end_time: None,
        min_severity: 2,
        unprocessed: true,
    });
    let encoded = encode_command(&cmd).unwrap();

    assert_eq!(encoded[0], 0x02);
    assert_eq!(decode_command(&encoded).unwrap(), cmd);
}

#[test]
fn test_encode_ping_has_empty_payload() {
    let encoded = encode_command(&Command::Ping).unwrap();

    assert_eq!(encoded, vec![0x03, 0, 0, 0, 0]);
    assert_eq!(decode_command(&encoded).unwrap(), Command::Ping);
}

#[test]
fn test_length_is_big_endian() {
    let encoded = encode_command(&Command::SendEvent(SendEventRequest::text("x"))).unwrap();
    let len = u32::from_be_bytes([encoded[1], encoded[2], encoded[3], encoded[4]]) as usize;

    assert_eq!(len, encoded.len() - HEADER_SIZE);
}

#[test]
fn test_get_alerts_payload_fields_are_optional() {
    let payload = b"{}";
    let mut frame = vec![0x02];
    frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    frame.extend_from_slice(payload);

    assert_eq!(
        decode_command(&frame).unwrap(),
        Command::GetAlerts(GetAlertsRequest::default())
    );
}

#[test]
fn test_decode_unknown_command() {
    let frame = vec![0x7f, 0, 0, 0, 0];
    assert!(matches!(decode_command(&frame), Err(InboxError::Protocol(_))));
}

#[test]
fn test_decode_incomplete_header() {
    assert!(matches!(decode_command(&[0x01, 0]), Err(InboxError::Protocol(_))));
}

#[test]
fn test_decode_incomplete_payload() {
    let mut encoded = encode_command(&Command::SendEvent(SendEventRequest::text("hello"))).unwrap();
    encoded.truncate(encoded.len() - 2);

    assert!(matches!(decode_command(&encoded), Err(InboxError::Protocol(_))));
}

#[test]
fn test_decode_invalid_json_payload() {
    let payload = b"{\"content\": 5}";
    let mut frame = vec![0x01];
    frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    frame.extend_from_slice(payload);

    assert!(matches!(decode_command(&frame), Err(InboxError::Protocol(_))));
}

#[test]
fn test_decode_ping_with_payload() {
    let frame = vec![0x03, 0, 0, 0, 1, b'x'];
    assert!(matches!(decode_command(&frame), Err(InboxError::Protocol(_))));
}

#[test]
fn test_decode_oversized_payload() {
    let mut frame = vec![0x01];
    frame.extend_from_slice(&(MAX_PAYLOAD_SIZE + 1).to_be_bytes());

    assert!(matches!(decode_command(&frame), Err(InboxError::Protocol(_))));
    assert!(matches!(
        read_command(&mut Cursor::new(frame)),
        Err(InboxError::Protocol(_))
    ));
}

// =============================================================================
// Response Encoding/Decoding Tests
// =============================================================================

#[test]
fn test_encode_decode_responses() {
    for response in [
        Response::ok(Some(b"{\"alerts\":[]}".to_vec())),
        Response::ok(None),
        Response::bad_request("bad"),
        Response::error("disk full"),
    ] {
        let encoded = encode_response(&response);
        assert_eq!(decode_response(&encoded).unwrap(), response);
    }
}

#[test]
fn test_decode_unknown_status() {
    let frame = vec![0x09, 0, 0, 0, 0];
    assert!(matches!(decode_response(&frame), Err(InboxError::Protocol(_))));
}

#[test]
fn test_response_json_body() {
    let response = Response::ok(Some(br#"{"status":"success"}"#.to_vec()));
    let body: traceinbox::service::SendEventResponse = response.json().unwrap();
    assert_eq!(body.status, "success");

    let error = Response::error("boom");
    assert_eq!(error.status, Status::Error);
    assert!(error.json::<serde_json::Value>().is_err());
    assert_eq!(error.payload_text(), "boom");
}

// =============================================================================
// Stream I/O Tests
// =============================================================================

#[test]
fn test_stream_round_trip_several_commands() {
    let commands = vec![
        Command::Ping,
        Command::SendEvent(SendEventRequest::text("a")),
        Command::GetAlerts(GetAlertsRequest::default()),
    ];

    let mut buffer = Vec::new();
    for cmd in &commands {
        write_command(&mut buffer, cmd).unwrap();
    }

    let mut cursor = Cursor::new(buffer);
    for cmd in &commands {
        assert_eq!(&read_command(&mut cursor).unwrap(), cmd);
    }

    // Stream exhausted
    assert!(matches!(read_command(&mut cursor), Err(InboxError::Io(_))));
}

#[test]
fn test_stream_response() {
    let mut buffer = Vec::new();
    write_response(&mut buffer, &Response::ok(Some(b"PONG".to_vec()))).unwrap();

    let response = read_response(&mut Cursor::new(buffer)).unwrap();
    assert_eq!(response.status, Status::Ok);
    assert_eq!(response.payload.as_deref(), Some(b"PONG".as_slice()));
}
