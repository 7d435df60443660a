//! Append-Only File (AOF) Module
//!
//! Provides durability by logging every mutating command.
//!
//! ## Responsibilities
//! - Append each mutating request before it is applied
//! - Periodic fsync from a background thread
//! - Replay on startup through the same dispatch path as live requests
//!
//! ## File Format
//! The file is the concatenation of the request arrays, byte-for-byte as
//! they arrive on the wire:
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ *3\r\n$3\r\nSET\r\n$1\r\na\r\n$1\r\n1\r\n     │
//! ├──────────────────────────────────────────────┤
//! │ *4\r\n$4\r\nHSET\r\n$1\r\nh\r\n...            │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Durability
//! With the periodic policy a crash can lose up to one flush interval of
//! appended commands. The file is never truncated or repaired; a corrupt
//! entry stops startup.

mod writer;
mod replay;
mod flusher;

pub use writer::AppendOnlyLog;
pub use replay::{replay_from, verify, ReplayStats};
pub use flusher::Flusher;
