//! AOF Replay
//!
//! Decodes the log from the start and hands each entry to a callback.

use std::fs::File;
use std::io::{BufRead, BufReader, Seek};
use std::path::Path;

use crate::error::{KvError, Result};
use crate::protocol::{read_value, Request, Value};

/// Result of a replay or verification pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReplayStats {
    /// Number of entries decoded and applied
    pub entries_replayed: u64,

    /// Bytes consumed from the log
    pub bytes_read: u64,
}

/// Replay entries from `reader` until a clean end of stream.
///
/// A decode error is reported as `LogCorruption`; nothing is skipped or
/// truncated. Errors returned by `apply` stop the replay as they are.
pub fn replay_from<R, F>(reader: &mut R, mut apply: F) -> Result<ReplayStats>
where
    R: BufRead + Seek,
    F: FnMut(Value) -> Result<()>,
{
    let mut stats = ReplayStats::default();

    loop {
        let offset = reader.stream_position()?;
        let entry = read_value(reader).map_err(|e| match e {
            KvError::MalformedInput(msg) => KvError::LogCorruption(format!(
                "entry {} at byte {}: {}",
                stats.entries_replayed + 1,
                offset,
                msg
            )),
            other => other,
        })?;

        let Some(value) = entry else {
            break;
        };

        apply(value)?;
        stats.entries_replayed += 1;
    }

    stats.bytes_read = reader.stream_position()?;
    Ok(stats)
}

/// Check an AOF without applying anything.
///
/// Every entry must decode and have the shape of a request.
pub fn verify(path: &Path) -> Result<ReplayStats> {
    let mut reader = BufReader::new(File::open(path)?);

    replay_from(&mut reader, |value| {
        Request::try_from(value)
            .map(|_| ())
            .map_err(|e| KvError::LogCorruption(e.to_string()))
    })
}
