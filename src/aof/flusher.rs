//! Background fsync
//!
//! A thread that syncs the AOF on a fixed interval until stopped.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, select, Sender};

use super::AppendOnlyLog;
use crate::error::Result;

/// Handle to the flusher thread. Dropping it stops the thread.
pub struct Flusher {
    /// Closing this channel stops the thread
    shutdown: Option<Sender<()>>,

    handle: Option<JoinHandle<()>>,
}

impl Flusher {
    /// Start syncing `log` every `interval`
    pub fn spawn(log: Arc<AppendOnlyLog>, interval: Duration) -> Result<Self> {
        let (shutdown_tx, shutdown_rx) = channel::bounded::<()>(1);
        let ticker = channel::tick(interval);

        let handle = thread::Builder::new()
            .name("aof-flusher".to_string())
            .spawn(move || {
                tracing::debug!(?interval, "AOF flusher started");
                loop {
                    select! {
                        recv(ticker) -> _ => {
                            if let Err(e) = log.sync() {
                                tracing::error!("AOF fsync failed: {}", e);
                            }
                        }
                        recv(shutdown_rx) -> _ => break,
                    }
                }
                if let Err(e) = log.sync() {
                    tracing::error!("Final AOF fsync failed: {}", e);
                }
                tracing::debug!("AOF flusher stopped");
            })?;

        Ok(Self {
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Stop the thread after one last sync, and wait for it
    pub fn stop(mut self) {
        self.shutdown_and_join();
    }

    fn shutdown_and_join(&mut self) {
        drop(self.shutdown.take());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("AOF flusher thread panicked");
            }
        }
    }
}

impl Drop for Flusher {
    fn drop(&mut self) {
        self.shutdown_and_join();
    }
}
