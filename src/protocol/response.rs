//! Response definitions
//!
//! Represents responses to clients.

use serde::de::DeserializeOwned;

use crate::error::{InboxError, Result};

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    BadRequest = 0x01,
    Error = 0x02,
}

/// A response to send to client
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Optional payload (JSON body for OK, error message otherwise)
    pub payload: Option<Vec<u8>>,
}

impl Response {
    /// Create an OK response with optional payload
    pub fn ok(payload: Option<Vec<u8>>) -> Self {
        Self {
            status: Status::Ok,
            payload,
        }
    }

    /// Create a BAD_REQUEST response
    pub fn bad_request(message: &str) -> Self {
        Self {
            status: Status::BadRequest,
            payload: Some(message.as_bytes().to_vec()),
        }
    }

    /// Create an ERROR response
    pub fn error(message: &str) -> Self {
        Self {
            status: Status::Error,
            payload: Some(message.as_bytes().to_vec()),
        }
    }

    /// Payload as (lossy) text
    pub fn payload_text(&self) -> String {
        self.payload
            .as_deref()
            .map(|p| String::from_utf8_lossy(p).into_owned())
            .unwrap_or_default()
    }

    /// Decode the JSON body of an OK response; other statuses become errors
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        match self.status {
            Status::Ok => {
                let payload = self.payload.as_deref().unwrap_or_default();
                Ok(serde_json::from_slice(payload)?)
            }
            Status::BadRequest => Err(InboxError::Protocol(format!(
                "bad request: {}",
                self.payload_text()
            ))),
            Status::Error => Err(InboxError::Network(format!(
                "server error: {}",
                self.payload_text()
            ))),
        }
    }
}
