//! Dispatch Module
//!
//! Resolves command names and runs their handlers against the stores.
//!
//! ## Responsibilities
//! - Name → `CommandKind` table, built once
//! - Arity checks with protocol error replies
//! - Handlers for PING, SET, GET, HSET, HGET, HGETALL, COMMAND
//!
//! The same dispatcher serves live connections and AOF replay. It never
//! touches the log; logging is the caller's job.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;

use crate::error::{KvError, Result};
use crate::protocol::{CommandKind, Line, Value};
use crate::store::{HashStore, StringStore};

/// Command table plus the stores it applies commands to
pub struct Dispatcher {
    /// Uppercase name → command
    table: HashMap<&'static str, CommandKind>,

    strings: Arc<StringStore>,

    hashes: Arc<HashStore>,
}

impl Dispatcher {
    /// Build the command table over the given stores
    pub fn new(strings: Arc<StringStore>, hashes: Arc<HashStore>) -> Self {
        let table = CommandKind::ALL
            .iter()
            .map(|kind| (kind.name(), *kind))
            .collect();

        Self {
            table,
            strings,
            hashes,
        }
    }

    /// Look up a command by name, case-insensitively
    pub fn resolve(&self, name: &str) -> Option<CommandKind> {
        if let Some(kind) = self.table.get(name) {
            return Some(*kind);
        }
        self.table.get(name.to_ascii_uppercase().as_str()).copied()
    }

    /// Resolve and run a command.
    ///
    /// Unknown names are `Err(UnknownCommand)`; everything else, including
    /// arity errors, comes back as a reply value.
    pub fn execute(&self, name: &str, args: &[Bytes]) -> Result<Value> {
        let kind = self
            .resolve(name)
            .ok_or_else(|| KvError::UnknownCommand(name.to_string()))?;
        Ok(self.dispatch(kind, args))
    }

    /// Run a resolved command
    pub fn dispatch(&self, kind: CommandKind, args: &[Bytes]) -> Value {
        if let Err(e) = kind.check_arity(args.len()) {
            return e.to_reply();
        }

        match kind {
            CommandKind::Ping => self.ping(args),
            CommandKind::Set => self.set(args),
            CommandKind::Get => self.get(args),
            CommandKind::HSet => self.hset(args),
            CommandKind::HGet => self.hget(args),
            CommandKind::HGetAll => self.hgetall(args),
            CommandKind::Command => Value::Array(Vec::new()),
        }
    }

    // =========================================================================
    // Handlers (arity already checked)
    // =========================================================================

    fn ping(&self, args: &[Bytes]) -> Value {
        match args.first() {
            Some(message) => Value::BulkString(message.clone()),
            None => Value::SimpleString(Line::lossy("PONG")),
        }
    }

    fn set(&self, args: &[Bytes]) -> Value {
        self.strings.set(args[0].clone(), args[1].clone());
        Value::ok()
    }

    fn get(&self, args: &[Bytes]) -> Value {
        match self.strings.get(&args[0]) {
            Some(value) => Value::BulkString(value),
            None => Value::Null,
        }
    }

    fn hset(&self, args: &[Bytes]) -> Value {
        self.hashes
            .set_field(args[0].clone(), args[1].clone(), args[2].clone());
        Value::ok()
    }

    fn hget(&self, args: &[Bytes]) -> Value {
        match self.hashes.get_field(&args[0], &args[1]) {
            Some(value) => Value::BulkString(value),
            None => Value::Null,
        }
    }

    fn hgetall(&self, args: &[Bytes]) -> Value {
        let Some(pairs) = self.hashes.get_all(&args[0]) else {
            return Value::Null;
        };

        let mut items = Vec::with_capacity(pairs.len() * 2);
        for (field, value) in pairs {
            items.push(Value::BulkString(field));
            items.push(Value::BulkString(value));
        }
        Value::Array(items)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn strings(&self) -> &Arc<StringStore> {
        &self.strings
    }

    pub fn hashes(&self) -> &Arc<HashStore> {
        &self.hashes
    }
}
