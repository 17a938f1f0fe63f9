//! TCP Server
//!
//! Accepts connections and dispatches them to worker threads.

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::Config;
use crate::error::{InboxError, Result};
use crate::protocol::{write_response, Response};
use crate::service::AlertService;

use super::Connection;

/// How long the accept loop sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// TCP server for the agent
pub struct Server {
    config: Config,
    service: AlertService,
    listener: TcpListener,
    shutdown: AtomicBool,
    active_connections: Arc<AtomicUsize>,
}

impl Server {
    /// Bind the listen address from the config
    pub fn bind(config: Config, service: AlertService) -> Result<Self> {
        if config.max_connections == 0 {
            return Err(InboxError::Config("max_connections must be at least 1".into()));
        }

        let listener = TcpListener::bind(&config.listen_addr)?;
        // Non-blocking so the accept loop can observe shutdown
        listener.set_nonblocking(true)?;

        Ok(Self {
            config,
            service,
            listener,
            shutdown: AtomicBool::new(false),
            active_connections: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Number of connections currently being served
    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::SeqCst)
    }

    /// Start the server (blocking until shutdown)
    pub fn run(&self) -> Result<()> {
        tracing::info!("Listening at {}", self.local_addr()?);

        while !self.shutdown.load(Ordering::SeqCst) {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    tracing::trace!("Accepted connection from {}", peer);
                    self.dispatch(stream);
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                }
            }
        }

        tracing::info!("Server shutting down");
        Ok(())
    }

    fn dispatch(&self, stream: TcpStream) {
        if self.active_connections.load(Ordering::SeqCst) >= self.config.max_connections {
            tracing::warn!(
                "Connection limit ({}) reached, rejecting client",
                self.config.max_connections
            );
            let mut stream = stream;
            let _ = write_response(&mut stream, &Response::error("too many connections"));
            return;
        }

        if let Err(e) = stream.set_nonblocking(false) {
            tracing::warn!("Failed to configure client socket: {}", e);
            return;
        }

        let service = self.service.clone();
        let active = Arc::clone(&self.active_connections);
        let read_ms = self.config.read_timeout_ms;
        let write_ms = self.config.write_timeout_ms;

        active.fetch_add(1, Ordering::SeqCst);
        let spawned = thread::Builder::new()
            .name("traceinbox-conn".to_string())
            .spawn({
                let active = Arc::clone(&active);
                move || {
                    let result = Connection::new(stream, service).and_then(|mut conn| {
                        conn.set_timeouts(read_ms, write_ms)?;
                        conn.handle()
                    });
                    if let Err(e) = result {
                        tracing::debug!("Connection ended with error: {}", e);
                    }
                    active.fetch_sub(1, Ordering::SeqCst);
                }
            });

        if let Err(e) = spawned {
            active.fetch_sub(1, Ordering::SeqCst);
            tracing::error!("Failed to spawn connection thread: {}", e);
        }
    }
}
