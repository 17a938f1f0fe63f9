//! Command definitions
//!
//! Represents requests from clients.

use crate::service::{GetAlertsRequest, SendEventRequest};

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    SendEvent = 0x01,
    GetAlerts = 0x02,
    Ping = 0x03,
}

impl CommandType {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(CommandType::SendEvent),
            0x02 => Some(CommandType::GetAlerts),
            0x03 => Some(CommandType::Ping),
            _ => None,
        }
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Store a webhook alert
    SendEvent(SendEventRequest),

    /// Query alerts
    GetAlerts(GetAlertsRequest),

    /// Ping (health check)
    Ping,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::SendEvent(_) => CommandType::SendEvent,
            Command::GetAlerts(_) => CommandType::GetAlerts,
            Command::Ping => CommandType::Ping,
        }
    }
}
