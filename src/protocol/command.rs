//! Command definitions
//!
//! The closed set of supported commands and the validated request shape.

use bytes::Bytes;

use super::Value;
use crate::error::{KvError, Result};

/// Name of the session-control command that ends a session
pub const EXIT_COMMAND: &str = "EXIT";

/// Supported commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Ping,
    Set,
    Get,
    HSet,
    HGet,
    HGetAll,
    Command,
}

/// Allowed argument counts, command name excluded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    Range { min: usize, max: usize },
    Any,
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Exact(n) => count == n,
            Arity::Range { min, max } => (min..=max).contains(&count),
            Arity::Any => true,
        }
    }
}

impl CommandKind {
    /// Every supported command, in table order
    pub const ALL: [CommandKind; 7] = [
        CommandKind::Ping,
        CommandKind::Set,
        CommandKind::Get,
        CommandKind::HSet,
        CommandKind::HGet,
        CommandKind::HGetAll,
        CommandKind::Command,
    ];

    /// Canonical (uppercase) name
    pub fn name(&self) -> &'static str {
        match self {
            CommandKind::Ping => "PING",
            CommandKind::Set => "SET",
            CommandKind::Get => "GET",
            CommandKind::HSet => "HSET",
            CommandKind::HGet => "HGET",
            CommandKind::HGetAll => "HGETALL",
            CommandKind::Command => "COMMAND",
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            CommandKind::Ping => Arity::Range { min: 0, max: 1 },
            CommandKind::Set => Arity::Exact(2),
            CommandKind::Get => Arity::Exact(1),
            CommandKind::HSet => Arity::Exact(3),
            CommandKind::HGet => Arity::Exact(2),
            CommandKind::HGetAll => Arity::Exact(1),
            CommandKind::Command => Arity::Any,
        }
    }

    /// Whether the command changes store state and must be logged
    pub fn is_mutating(&self) -> bool {
        matches!(self, CommandKind::Set | CommandKind::HSet)
    }

    /// Check an argument count against the command's arity
    pub fn check_arity(&self, count: usize) -> Result<()> {
        if self.arity().accepts(count) {
            Ok(())
        } else {
            Err(KvError::Arity {
                command: self.name().to_ascii_lowercase(),
            })
        }
    }
}

/// A request: a non-empty array of bulk strings.
///
/// Keeps the original frame so it can be appended to the AOF verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Command name, normalized to uppercase
    name: String,

    /// Arguments after the command name
    args: Vec<Bytes>,

    /// The array value as received
    frame: Value,
}

impl Request {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[Bytes] {
        &self.args
    }

    pub fn frame(&self) -> &Value {
        &self.frame
    }

    pub fn is_exit(&self) -> bool {
        self.name == EXIT_COMMAND
    }
}

impl TryFrom<Value> for Request {
    type Error = KvError;

    fn try_from(frame: Value) -> Result<Self> {
        let items = match &frame {
            Value::Array(items) => items,
            other => {
                return Err(KvError::InvalidRequest(format!(
                    "expected array, got {}",
                    other.kind()
                )))
            }
        };

        let mut parts = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Value::BulkString(b) => parts.push(b.clone()),
                other => {
                    return Err(KvError::InvalidRequest(format!(
                        "expected bulk string elements, got {}",
                        other.kind()
                    )))
                }
            }
        }

        if parts.is_empty() {
            return Err(KvError::InvalidRequest("empty array".to_string()));
        }

        let name = String::from_utf8_lossy(&parts.remove(0)).to_ascii_uppercase();

        Ok(Self {
            name,
            args: parts,
            frame,
        })
    }
}
