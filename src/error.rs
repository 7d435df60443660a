//! Error types for respkv
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

use crate::protocol::Value;

/// Result type alias using KvError
pub type Result<T> = std::result::Result<T, KvError>;

/// Unified error type for respkv operations
#[derive(Debug, Error)]
pub enum KvError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Append-Only Log Errors
    // -------------------------------------------------------------------------
    #[error("AOF write failed: {0}")]
    LogWrite(String),

    #[error("AOF corruption detected: {0}")]
    LogCorruption(String),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    MalformedInput(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    // -------------------------------------------------------------------------
    // Command Errors
    // -------------------------------------------------------------------------
    #[error("ERR wrong number of arguments for '{command}' command")]
    Arity { command: String },

    #[error("ERR unknown command '{0}'")]
    UnknownCommand(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl KvError {
    /// Convert the error into the Error value sent back to a client.
    ///
    /// Command errors already carry the `ERR` prefix; everything else is
    /// prefixed here.
    pub fn to_reply(&self) -> Value {
        match self {
            KvError::Arity { .. } | KvError::UnknownCommand(_) => Value::error(self.to_string()),
            _ => Value::error(format!("ERR {}", self)),
        }
    }

    /// Whether the error came from the transport rather than the peer's bytes
    pub fn is_disconnect(&self) -> bool {
        match self {
            KvError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::UnexpectedEof
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::WouldBlock
                    | std::io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }
}
