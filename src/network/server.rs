//! TCP Server
//!
//! Accepts connections and hands each one to a session thread.

use std::io::Write;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::connection::{Connection, SessionEnd};
use crate::config::{AcceptMode, Config, ExitBehavior};
use crate::engine::Engine;
use crate::error::{KvError, Result};

/// How often the non-blocking accept loop checks for shutdown
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Why `Server::run` returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerExit {
    /// `shutdown()` was called
    Shutdown,

    /// The only client of a `Single` server left
    ClientLeft,

    /// A client sent `EXIT` under `ExitBehavior::Process`
    ExitCommand,
}

/// State shared between the acceptor and the session threads
struct Shared {
    shutdown: AtomicBool,
    exit_requested: AtomicBool,
    active_connections: AtomicUsize,
}

/// TCP server for respkv
pub struct Server {
    config: Config,
    engine: Arc<Engine>,
    listener: TcpListener,
    shared: Arc<Shared>,
}

impl Server {
    /// Bind the listener. Fails if the address is unavailable.
    pub fn bind(config: Config, engine: Arc<Engine>) -> Result<Self> {
        let listener = TcpListener::bind(&config.listen_addr).map_err(|e| {
            KvError::Network(format!("failed to bind {}: {}", config.listen_addr, e))
        })?;

        Ok(Self {
            config,
            engine,
            listener,
            shared: Arc::new(Shared {
                shutdown: AtomicBool::new(false),
                exit_requested: AtomicBool::new(false),
                active_connections: AtomicUsize::new(0),
            }),
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until shutdown, `EXIT`, or (in `Single` mode) the client leaves
    pub fn run(&self) -> Result<ServerExit> {
        tracing::info!(
            "Listening on {} ({:?} mode)",
            self.local_addr()?,
            self.config.accept_mode
        );

        match self.config.accept_mode {
            AcceptMode::Single => self.run_single(),
            AcceptMode::Concurrent => self.run_concurrent(),
        }
    }

    /// Signal the server to stop accepting
    pub fn shutdown(&self) {
        self.shared.shutdown.store(true, Ordering::Release);
    }

    /// Number of sessions currently running
    pub fn active_connections(&self) -> usize {
        self.shared.active_connections.load(Ordering::Acquire)
    }

    /// Accept one client and serve it on this thread
    fn run_single(&self) -> Result<ServerExit> {
        let (stream, addr) = self.listener.accept()?;
        tracing::info!("Accepted {}", addr);

        self.shared.active_connections.fetch_add(1, Ordering::AcqRel);
        let end = serve(stream, Arc::clone(&self.engine), &self.config);
        self.shared.active_connections.fetch_sub(1, Ordering::AcqRel);

        match end {
            Some(SessionEnd::ExitRequested) if self.config.exit_behavior == ExitBehavior::Process => {
                Ok(ServerExit::ExitCommand)
            }
            _ => Ok(ServerExit::ClientLeft),
        }
    }

    /// Accept in a loop, one thread per connection
    fn run_concurrent(&self) -> Result<ServerExit> {
        self.listener.set_nonblocking(true)?;

        while !self.shared.shutdown.load(Ordering::Acquire) {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    stream.set_nonblocking(false)?;
                    self.spawn_session(stream, addr);
                }
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
            }
        }

        if self.shared.exit_requested.load(Ordering::Acquire) {
            Ok(ServerExit::ExitCommand)
        } else {
            Ok(ServerExit::Shutdown)
        }
    }

    fn spawn_session(&self, mut stream: TcpStream, addr: SocketAddr) {
        let active = self.shared.active_connections.fetch_add(1, Ordering::AcqRel);
        if active >= self.config.max_connections {
            self.shared.active_connections.fetch_sub(1, Ordering::AcqRel);
            tracing::warn!("Rejecting {}: {} connections open", addr, active);
            let _ = stream.write_all(b"-ERR max number of clients reached\r\n");
            return;
        }

        let engine = Arc::clone(&self.engine);
        let config = self.config.clone();
        let shared = Arc::clone(&self.shared);

        let spawned = thread::Builder::new()
            .name(format!("conn-{}", addr))
            .spawn(move || {
                let end = serve(stream, engine, &config);
                shared.active_connections.fetch_sub(1, Ordering::AcqRel);

                if end == Some(SessionEnd::ExitRequested)
                    && config.exit_behavior == ExitBehavior::Process
                {
                    shared.exit_requested.store(true, Ordering::Release);
                    shared.shutdown.store(true, Ordering::Release);
                }
            });

        if let Err(e) = spawned {
            self.shared.active_connections.fetch_sub(1, Ordering::AcqRel);
            tracing::error!("Failed to spawn session for {}: {}", addr, e);
        }
    }
}

/// Run one session to completion. `None` if it ended with an error.
fn serve(stream: TcpStream, engine: Arc<Engine>, config: &Config) -> Option<SessionEnd> {
    let mut connection = match Connection::new(stream, engine) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Failed to set up connection: {}", e);
            return None;
        }
    };

    if let Err(e) = connection.set_timeouts(config.read_timeout_ms, config.write_timeout_ms) {
        tracing::warn!("Failed to set timeouts for {}: {}", connection.peer_addr(), e);
        return None;
    }

    match connection.handle() {
        Ok(end) => Some(end),
        Err(e) => {
            tracing::debug!("Session {} ended with error: {}", connection.peer_addr(), e);
            None
        }
    }
}
