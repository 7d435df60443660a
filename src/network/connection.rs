//! Connection Handler
//!
//! Handles individual client connections.

use std::io::{BufReader, BufWriter};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use crate::engine::Engine;
use crate::error::{KvError, Result};
use crate::protocol::{read_value, write_value, Request, Value};

/// How a session ended without an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The client went away
    Disconnected,

    /// The client sent `EXIT`
    ExitRequested,
}

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Reference to the storage engine
    engine: Arc<Engine>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    pub fn new(stream: TcpStream, engine: Arc<Engine>) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            engine,
            peer_addr,
        })
    }

    /// Configure connection timeouts (0 leaves the socket blocking)
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        if read_ms > 0 {
            self.reader
                .get_ref()
                .set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            self.writer
                .get_ref()
                .set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }
        Ok(())
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Requests are processed strictly in arrival order. Frames that are
    /// not arrays of bulk strings are logged and get no reply. Malformed
    /// bytes get a protocol error reply and end the session.
    pub fn handle(&mut self) -> Result<SessionEnd> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        loop {
            let frame = match read_value(&mut self.reader) {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    return Ok(SessionEnd::Disconnected);
                }
                Err(e) if e.is_disconnect() => {
                    tracing::debug!("Client {} dropped: {}", self.peer_addr, e);
                    return Ok(SessionEnd::Disconnected);
                }
                Err(e @ KvError::MalformedInput(_)) => {
                    tracing::warn!("Malformed input from {}: {}", self.peer_addr, e);
                    let _ = self.send_reply(&e.to_reply());
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    return Err(e);
                }
            };

            let request = match Request::try_from(frame) {
                Ok(request) => request,
                Err(e) => {
                    tracing::warn!("Ignoring request from {}: {}", self.peer_addr, e);
                    continue;
                }
            };

            tracing::trace!(
                "Received {} with {} args from {}",
                request.name(),
                request.args().len(),
                self.peer_addr
            );

            if request.is_exit() {
                tracing::info!("Client {} sent EXIT", self.peer_addr);
                return Ok(SessionEnd::ExitRequested);
            }

            let reply = match self.engine.execute(&request) {
                Ok(reply) => reply,
                Err(e) => {
                    tracing::error!("{} from {} not applied: {}", request.name(), self.peer_addr, e);
                    e.to_reply()
                }
            };

            if let Err(e) = self.send_reply(&reply) {
                if e.is_disconnect() {
                    tracing::debug!(
                        "Client {} disconnected before reply could be sent: {}",
                        self.peer_addr,
                        e
                    );
                    return Ok(SessionEnd::Disconnected);
                }
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                return Err(e);
            }
        }
    }

    /// Send a reply to the client
    fn send_reply(&mut self, reply: &Value) -> Result<()> {
        write_value(&mut self.writer, reply)
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}
