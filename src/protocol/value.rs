//! Value definitions
//!
//! The six RESP shapes shared by the codec, the dispatcher and the AOF.

use std::fmt;

use bytes::Bytes;

use crate::error::{KvError, Result};

/// Single-line text carried by simple strings and errors.
///
/// Never contains `\r` or `\n`, so every `Value` can be encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Line(String);

impl Line {
    /// Build a line, rejecting embedded CR/LF
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.contains(&['\r', '\n'][..]) {
            return Err(KvError::InvalidValue(format!(
                "line text may not contain CR or LF: {:?}",
                text
            )));
        }
        Ok(Self(text))
    }

    /// Build a line, replacing CR/LF with spaces
    pub fn lossy(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.contains(&['\r', '\n'][..]) {
            Self(text.replace(&['\r', '\n'][..], " "))
        } else {
            Self(text)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A protocol value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// `+<text>\r\n`
    SimpleString(Line),

    /// `-<text>\r\n`
    Error(Line),

    /// `:<n>\r\n`
    Integer(i64),

    /// `$<len>\r\n<bytes>\r\n`, possibly empty
    BulkString(Bytes),

    /// `$-1\r\n`
    Null,

    /// `*<count>\r\n` followed by the elements
    Array(Vec<Value>),
}

impl Value {
    /// `+OK`
    pub fn ok() -> Self {
        Value::SimpleString(Line::lossy("OK"))
    }

    /// Simple string; fails on CR/LF
    pub fn simple(text: impl Into<String>) -> Result<Self> {
        Ok(Value::SimpleString(Line::new(text)?))
    }

    /// Error reply. CR/LF in the message (e.g. an echoed command name)
    /// are replaced with spaces.
    pub fn error(message: impl Into<String>) -> Self {
        Value::Error(Line::lossy(message))
    }

    pub fn bulk(data: impl Into<Bytes>) -> Self {
        Value::BulkString(data.into())
    }

    /// Array of bulk strings, the shape of every request
    pub fn command<I, T>(parts: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Bytes>,
    {
        Value::Array(parts.into_iter().map(|p| Value::BulkString(p.into())).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    pub fn as_bulk(&self) -> Option<&Bytes> {
        match self {
            Value::BulkString(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Short name of the variant, for log messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::SimpleString(_) => "simple string",
            Value::Error(_) => "error",
            Value::Integer(_) => "integer",
            Value::BulkString(_) => "bulk string",
            Value::Null => "null",
            Value::Array(_) => "array",
        }
    }
}
