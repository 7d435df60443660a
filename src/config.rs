//! Configuration for respkv
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{KvError, Result};

/// File name of the AOF inside the data directory
pub const AOF_FILENAME: &str = "database.aof";

/// Main configuration for a respkv instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for the append-only file
    /// Internal structure:
    ///   {data_dir}/
    ///     └── database.aof     (append-only command log)
    pub data_dir: PathBuf,

    // -------------------------------------------------------------------------
    // AOF Configuration
    // -------------------------------------------------------------------------
    /// Sync policy: how often to fsync the AOF
    pub aof_sync_policy: AofSyncPolicy,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max concurrent client connections
    pub max_connections: usize,

    /// Whether to serve many clients or exactly one
    pub accept_mode: AcceptMode,

    /// What the `EXIT` command shuts down
    pub exit_behavior: ExitBehavior,

    /// Connection read timeout (milliseconds, 0 = block indefinitely)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = block indefinitely)
    pub write_timeout_ms: u64,
}

/// AOF sync policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AofSyncPolicy {
    /// fsync inside every append (safest, slowest)
    EveryWrite,

    /// fsync from a background thread on a fixed interval.
    /// A crash loses at most one interval of appended commands.
    Periodic { interval_ms: u64 },
}

impl AofSyncPolicy {
    /// The default once-per-second policy
    pub const EVERY_SECOND: AofSyncPolicy = AofSyncPolicy::Periodic { interval_ms: 1000 };

    /// Interval of the background flusher, if any
    pub fn interval(&self) -> Option<Duration> {
        match self {
            AofSyncPolicy::EveryWrite => None,
            AofSyncPolicy::Periodic { interval_ms } => Some(Duration::from_millis(*interval_ms)),
        }
    }
}

/// How the server accepts connections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptMode {
    /// Accept one client, serve it until it leaves, then stop
    Single,

    /// Accept in a loop, one thread per connection
    Concurrent,
}

/// Scope of the `EXIT` command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitBehavior {
    /// Close only the connection that sent `EXIT`
    CloseConnection,

    /// Stop the server; the binary exits with status 1
    Process,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./respkv_data"),
            aof_sync_policy: AofSyncPolicy::EVERY_SECOND,
            listen_addr: "127.0.0.1:6379".to_string(),
            max_connections: 1024,
            accept_mode: AcceptMode::Concurrent,
            exit_behavior: ExitBehavior::CloseConnection,
            read_timeout_ms: 0,
            write_timeout_ms: 0,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Full path of the AOF
    pub fn aof_path(&self) -> PathBuf {
        self.data_dir.join(AOF_FILENAME)
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.max_connections == 0 {
            return Err(KvError::Config("max_connections must be at least 1".to_string()));
        }
        if let AofSyncPolicy::Periodic { interval_ms: 0 } = self.aof_sync_policy {
            return Err(KvError::Config("AOF sync interval must be non-zero".to_string()));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for the AOF)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the AOF sync policy
    pub fn aof_sync_policy(mut self, policy: AofSyncPolicy) -> Self {
        self.config.aof_sync_policy = policy;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the accept mode
    pub fn accept_mode(mut self, mode: AcceptMode) -> Self {
        self.config.accept_mode = mode;
        self
    }

    /// Set what `EXIT` terminates
    pub fn exit_behavior(mut self, behavior: ExitBehavior) -> Self {
        self.config.exit_behavior = behavior;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
