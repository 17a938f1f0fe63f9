//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! Requests and responses share one frame layout:
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Tag (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//! The tag is the command type for requests and the status for responses.
//! Length is big-endian.
//!
//! ### Payload by Command Type
//! - SEND_EVENT: JSON `SendEventRequest`
//! - GET_ALERTS: JSON `GetAlertsRequest`
//! - PING:       empty

use std::io::{Read, Write};

use crate::error::{InboxError, Result};
use super::{Command, CommandType, Response, Status};

/// Header size: 1 byte tag + 4 bytes length
pub const HEADER_SIZE: usize = 5;

/// Maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

// =============================================================================
// Framing
// =============================================================================

fn encode_frame(tag: u8, payload: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(HEADER_SIZE + payload.len());
    message.push(tag);
    message.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    message.extend_from_slice(payload);
    message
}

fn check_payload_len(payload_len: usize) -> Result<()> {
    if payload_len > MAX_PAYLOAD_SIZE as usize {
        return Err(InboxError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            payload_len, MAX_PAYLOAD_SIZE
        )));
    }
    Ok(())
}

/// Split a complete frame into tag and payload
fn split_frame(bytes: &[u8]) -> Result<(u8, &[u8])> {
    if bytes.len() < HEADER_SIZE {
        return Err(InboxError::Protocol(format!(
            "Incomplete header: expected {} bytes, got {}",
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let tag = bytes[0];
    let payload_len = u32::from_be_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]) as usize;
    check_payload_len(payload_len)?;

    let total_len = HEADER_SIZE + payload_len;
    if bytes.len() < total_len {
        return Err(InboxError::Protocol(format!(
            "Incomplete payload: expected {} bytes, got {}",
            total_len,
            bytes.len()
        )));
    }

    Ok((tag, &bytes[HEADER_SIZE..total_len]))
}

/// Read one frame from a stream
///
/// Blocks until a complete frame is received or an error occurs
pub fn read_frame<R: Read>(reader: &mut R) -> Result<(u8, Vec<u8>)> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let payload_len = u32::from_be_bytes([header[1], header[2], header[3], header[4]]) as usize;
    check_payload_len(payload_len)?;

    let mut payload = vec![0u8; payload_len];
    if payload_len > 0 {
        reader.read_exact(&mut payload)?;
    }

    Ok((header[0], payload))
}

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Encode a command to bytes
///
/// Format: cmd_type (1) + payload_len (4) + payload
pub fn encode_command(command: &Command) -> Result<Vec<u8>> {
    let payload = match command {
        Command::SendEvent(request) => serde_json::to_vec(request)?,
        Command::GetAlerts(request) => serde_json::to_vec(request)?,
        Command::Ping => Vec::new(),
    };

    Ok(encode_frame(command.command_type() as u8, &payload))
}

/// Decode a command from a complete frame
pub fn decode_command(bytes: &[u8]) -> Result<Command> {
    let (tag, payload) = split_frame(bytes)?;
    command_from_frame(tag, payload)
}

/// Build a command from an already-split frame
pub fn command_from_frame(tag: u8, payload: &[u8]) -> Result<Command> {
    let command_type = CommandType::from_byte(tag).ok_or_else(|| {
        InboxError::Protocol(format!("Unknown command type: 0x{:02x}", tag))
    })?;

    match command_type {
        CommandType::SendEvent => Ok(Command::SendEvent(parse_payload(payload, "SEND_EVENT")?)),
        CommandType::GetAlerts => Ok(Command::GetAlerts(parse_payload(payload, "GET_ALERTS")?)),
        CommandType::Ping => {
            if !payload.is_empty() {
                return Err(InboxError::Protocol(format!(
                    "PING command: unexpected payload of {} bytes",
                    payload.len()
                )));
            }
            Ok(Command::Ping)
        }
    }
}

fn parse_payload<T: serde::de::DeserializeOwned>(payload: &[u8], name: &str) -> Result<T> {
    serde_json::from_slice(payload)
        .map_err(|e| InboxError::Protocol(format!("{} command: invalid payload: {}", name, e)))
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
///
/// Format: status (1) + payload_len (4) + payload
pub fn encode_response(response: &Response) -> Vec<u8> {
    let payload = response.payload.as_deref().unwrap_or(&[]);
    encode_frame(response.status as u8, payload)
}

/// Decode a response from bytes
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let (tag, payload) = split_frame(bytes)?;
    response_from_frame(tag, payload.to_vec())
}

fn response_from_frame(tag: u8, payload: Vec<u8>) -> Result<Response> {
    let status = match tag {
        0x00 => Status::Ok,
        0x01 => Status::BadRequest,
        0x02 => Status::Error,
        _ => {
            return Err(InboxError::Protocol(format!(
                "Unknown response status: 0x{:02x}",
                tag
            )))
        }
    };

    let payload = if payload.is_empty() { None } else { Some(payload) };

    Ok(Response { status, payload })
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read a complete command from a stream
pub fn read_command<R: Read>(reader: &mut R) -> Result<Command> {
    let (tag, payload) = read_frame(reader)?;
    command_from_frame(tag, &payload)
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    let bytes = encode_command(command)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    let (tag, payload) = read_frame(reader)?;
    response_from_frame(tag, payload)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}
