//! Engine Module
//!
//! Coordinates the stores, the dispatcher and the append-only log.
//!
//! ## Responsibilities
//! - Open the AOF and replay it before serving anything
//! - Log mutating requests before applying them
//! - Own the background flusher
//! - Close cleanly (stop the flusher, final fsync)

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::aof::{AppendOnlyLog, Flusher, ReplayStats};
use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::error::{KvError, Result};
use crate::protocol::{Request, Value};
use crate::store::{HashStore, StringStore};

/// The main storage engine
///
/// ## Request lifecycle
/// 1. Resolve the command (unknown → error reply, nothing logged)
/// 2. Check arity (wrong → error reply, nothing logged)
/// 3. Mutating commands: append the original frame to the AOF. If that
///    fails the command is not applied and the caller gets the error.
/// 4. Dispatch against the stores
///
/// Logging before applying means a crash mid-apply replays the command
/// rather than losing it.
///
/// ## Ordering across connections
/// The append (log lock) and the apply (store lock) are separate critical
/// sections; no lock spans both. Two concurrent writes to the same key can
/// therefore be logged A, B and applied B, A, and a replay then ends on A
/// while the live store held B. Writes from one connection, and writes to
/// different keys, replay to the live state.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Path of the AOF inside `data_dir`
    aof_path: PathBuf,

    /// Command table and stores
    dispatcher: Dispatcher,

    /// Shared with the flusher thread
    aof: Arc<AppendOnlyLog>,

    /// Background fsync, absent under `EveryWrite`
    flusher: Mutex<Option<Flusher>>,

    /// What the startup replay did
    replay_stats: ReplayStats,
}

impl Engine {
    /// Open or create an engine with the given config
    ///
    /// On startup:
    /// 1. Create the data directory
    /// 2. Open (or create) the AOF
    /// 3. Replay it into empty stores
    /// 4. Start the flusher
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;

        fs::create_dir_all(&config.data_dir)?;
        let aof_path = config.aof_path();

        let aof = Arc::new(AppendOnlyLog::open(&aof_path, config.aof_sync_policy)?);

        let dispatcher = Dispatcher::new(Arc::new(StringStore::new()), Arc::new(HashStore::new()));

        let replay_stats = aof.replay(|frame| Self::apply_replayed(&dispatcher, frame))?;
        if replay_stats.entries_replayed > 0 {
            tracing::info!(
                entries = replay_stats.entries_replayed,
                bytes = replay_stats.bytes_read,
                "AOF replay complete"
            );
        }

        let flusher = match config.aof_sync_policy.interval() {
            Some(interval) => Some(Flusher::spawn(Arc::clone(&aof), interval)?),
            None => None,
        };

        Ok(Self {
            config,
            aof_path,
            dispatcher,
            aof,
            flusher: Mutex::new(flusher),
            replay_stats,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let mut config = Config::default();
        config.data_dir = path.to_path_buf();
        Self::open(config)
    }

    /// Apply one AOF entry, bypassing the log
    fn apply_replayed(dispatcher: &Dispatcher, frame: Value) -> Result<()> {
        let request =
            Request::try_from(frame).map_err(|e| KvError::LogCorruption(e.to_string()))?;

        match dispatcher.execute(request.name(), request.args()) {
            Ok(reply) => {
                if let Value::Error(message) = reply {
                    tracing::warn!("Replayed {} returned error: {}", request.name(), message);
                }
            }
            Err(KvError::UnknownCommand(name)) => {
                tracing::warn!("Skipping unknown command '{}' in AOF", name);
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    /// Execute a request and produce its reply
    ///
    /// `Err` only for log-write failures (`LogWrite`), in which case nothing
    /// was applied; command errors are replies.
    pub fn execute(&self, request: &Request) -> Result<Value> {
        let Some(kind) = self.dispatcher.resolve(request.name()) else {
            tracing::debug!("Unknown command '{}'", request.name());
            return Ok(KvError::UnknownCommand(request.name().to_string()).to_reply());
        };

        if let Err(e) = kind.check_arity(request.args().len()) {
            return Ok(e.to_reply());
        }

        if kind.is_mutating() {
            self.aof.append(request.frame())?;
        }

        Ok(self.dispatcher.dispatch(kind, request.args()))
    }

    /// Execute a request given as a raw value
    pub fn execute_value(&self, frame: Value) -> Result<Value> {
        let request = Request::try_from(frame)?;
        self.execute(&request)
    }

    /// fsync the AOF now
    pub fn sync(&self) -> Result<()> {
        self.aof.sync()
    }

    /// Close the engine gracefully
    ///
    /// Stops the flusher and syncs the AOF to disk
    pub fn close(&self) -> Result<()> {
        if let Some(flusher) = self.flusher.lock().take() {
            flusher.stop();
        }
        self.aof.sync()
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the AOF path
    pub fn aof_path(&self) -> &Path {
        &self.aof_path
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn strings(&self) -> &StringStore {
        self.dispatcher.strings()
    }

    pub fn hashes(&self) -> &HashStore {
        self.dispatcher.hashes()
    }

    /// Statistics of the replay performed by `open`
    pub fn replay_stats(&self) -> &ReplayStats {
        &self.replay_stats
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
