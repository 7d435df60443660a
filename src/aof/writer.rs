//! AOF file handle
//!
//! One file shared by appends, the flusher and replay, guarded by one lock.

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use super::replay::{replay_from, ReplayStats};
use crate::config::AofSyncPolicy;
use crate::error::{KvError, Result};
use crate::protocol::{encode_value, Value};

/// The append-only command log
///
/// ## Concurrency:
/// - `file`: one Mutex covers writes, fsyncs and replay, so appends never
///   interleave and a flush sees a prefix of completed appends
/// - All methods use `&self`
///
/// ## Failed appends:
/// A write or fsync error cuts the file back to its length before the
/// append, so the entry is neither applied nor replayed. If that cut fails
/// too the log is poisoned and refuses every later append; replay and sync
/// still work.
pub struct AppendOnlyLog {
    /// Location of the file
    path: PathBuf,

    /// Opened read + append, created if absent, never truncated
    file: Mutex<File>,

    /// When to fsync
    sync_policy: AofSyncPolicy,

    /// Set when a failed append could not be rolled back
    poisoned: AtomicBool,
}

impl AppendOnlyLog {
    /// Open or create the AOF at `path`
    pub fn open(path: &Path, sync_policy: AofSyncPolicy) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)?;

        tracing::debug!(path = %path.display(), ?sync_policy, "AOF opened");

        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
            sync_policy,
            poisoned: AtomicBool::new(false),
        })
    }

    /// Append one value to the end of the log.
    ///
    /// Every failure is `LogWrite`; nothing from a failed append remains
    /// unless the log ends up poisoned.
    pub fn append(&self, value: &Value) -> Result<()> {
        let bytes = encode_value(value);

        let mut file = self.file.lock();
        if self.is_poisoned() {
            return Err(KvError::LogWrite(
                "log is poisoned by an earlier append that could not be rolled back".to_string(),
            ));
        }

        let start = file
            .metadata()
            .map_err(|e| KvError::LogWrite(e.to_string()))?
            .len();

        if let Err(e) = write_entry(&mut file, &bytes, self.sync_policy) {
            self.roll_back(&file, start);
            return Err(KvError::LogWrite(e.to_string()));
        }

        Ok(())
    }

    /// Cut the file back to `len` after a failed append
    fn roll_back(&self, file: &File, len: u64) {
        match file.set_len(len) {
            Ok(()) => tracing::warn!(len, "Rolled back failed AOF append"),
            Err(e) => {
                tracing::error!("AOF rollback to {} bytes failed, refusing appends: {}", len, e);
                self.poisoned.store(true, Ordering::Release);
            }
        }
    }

    /// Force appended data to stable storage
    pub fn sync(&self) -> Result<()> {
        self.file.lock().sync_data()?;
        Ok(())
    }

    /// Replay every entry from the start of the file, in order.
    ///
    /// Holds the log lock for the whole replay.
    pub fn replay<F>(&self, apply: F) -> Result<ReplayStats>
    where
        F: FnMut(Value) -> Result<()>,
    {
        let file = self.file.lock();

        let mut handle = file.try_clone()?;
        handle.seek(SeekFrom::Start(0))?;
        let mut reader = BufReader::new(handle);

        replay_from(&mut reader, apply)
    }

    /// Current file size in bytes
    pub fn len(&self) -> Result<u64> {
        Ok(self.file.lock().metadata()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sync_policy(&self) -> AofSyncPolicy {
        self.sync_policy
    }

    /// Whether appends are refused after a failed rollback
    pub fn is_poisoned(&self) -> bool {
        self.poisoned.load(Ordering::Acquire)
    }

    /// Swap the underlying file handle
    #[cfg(test)]
    pub(crate) fn replace_file(&self, file: File) {
        *self.file.lock() = file;
    }
}

fn write_entry(file: &mut File, bytes: &[u8], policy: AofSyncPolicy) -> io::Result<()> {
    file.write_all(bytes)?;
    if policy == AofSyncPolicy::EveryWrite {
        file.sync_data()?;
    }
    Ok(())
}
