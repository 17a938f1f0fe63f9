//! Protocol Module
//!
//! Defines the wire protocol between the CLI and the agents.
//!
//! ## Protocol Format (V1 - Framed JSON)
//!
//! ### Request Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │     Payload (JSON)          │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Commands
//! - 0x01: SEND_EVENT - Payload: SendEventRequest
//! - 0x02: GET_ALERTS - Payload: GetAlertsRequest
//! - 0x03: PING       - Payload: empty
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Status Codes
//! - 0x00: OK          - Payload: JSON response body (or `PONG`)
//! - 0x01: BAD_REQUEST - Payload: error message
//! - 0x02: ERROR       - Payload: error message

mod command;
mod response;
mod codec;

pub use command::{Command, CommandType};
pub use response::{Response, Status};
pub use codec::{
    encode_command, decode_command, encode_response, decode_response,
    read_frame, command_from_frame,
    read_command, write_command, read_response, write_response,
    HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
