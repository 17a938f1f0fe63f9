//! Blocking client for one agent

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::error::{InboxError, Result};
use crate::protocol::{read_response, write_command, Command, Response, Status};
use crate::service::{AlertRecord, GetAlertsRequest, GetAlertsResponse, SendEventRequest, SendEventResponse};

/// Connection to a single agent
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    /// Connect with a timeout applied to connect, reads and writes
    pub fn connect(addr: &str, timeout: Duration) -> Result<Self> {
        let socket_addr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| InboxError::Network(format!("cannot resolve {}", addr)))?;

        let stream = TcpStream::connect_timeout(&socket_addr, timeout)?;
        stream.set_nodelay(true)?;
        stream.set_read_timeout(Some(timeout))?;
        stream.set_write_timeout(Some(timeout))?;

        let read_stream = stream.try_clone()?;
        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
        })
    }

    /// Send a command and wait for its response
    pub fn request(&mut self, command: &Command) -> Result<Response> {
        write_command(&mut self.writer, command)?;
        read_response(&mut self.reader)
    }

    /// Deliver a webhook alert
    pub fn send_event(&mut self, request: SendEventRequest) -> Result<SendEventResponse> {
        self.request(&Command::SendEvent(request))?.json()
    }

    /// Query alerts, newest first
    pub fn get_alerts(&mut self, request: GetAlertsRequest) -> Result<Vec<AlertRecord>> {
        let response: GetAlertsResponse = self.request(&Command::GetAlerts(request))?.json()?;
        Ok(response.alerts)
    }

    /// Health check
    pub fn ping(&mut self) -> Result<()> {
        let response = self.request(&Command::Ping)?;
        match response.status {
            Status::Ok if response.payload.as_deref() == Some(b"PONG".as_slice()) => Ok(()),
            _ => Err(InboxError::Protocol(format!(
                "unexpected ping reply: {:?} {}",
                response.status,
                response.payload_text()
            ))),
        }
    }
}
