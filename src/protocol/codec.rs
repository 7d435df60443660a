//! Protocol codec
//!
//! Encoding and decoding functions for the RESP wire protocol.
//!
//! ## Wire Format
//!
//! The first byte of every encoded unit is its type tag:
//! ```text
//! +<text>\r\n                   simple string
//! -<text>\r\n                   error
//! :<base10>\r\n                 integer
//! $<len>\r\n<bytes>\r\n         bulk string ($-1\r\n is null)
//! *<count>\r\n<value>...        array (*-1\r\n decodes to null)
//! ```
//!
//! ## Decoding stance
//! Decoding is strict. An unknown type tag is rejected, and a bulk string
//! must be followed by `\r\n` exactly where its declared length ends.
//! Either failure is `MalformedInput`, which ends the connection.

use std::io::{self, BufRead, Read, Write};

use bytes::{BufMut, Bytes, BytesMut};

use super::value::{Line, Value};
use crate::error::{KvError, Result};

/// Line terminator
pub const CRLF: &[u8] = b"\r\n";

pub const SIMPLE_STRING_TAG: u8 = b'+';
pub const ERROR_TAG: u8 = b'-';
pub const INTEGER_TAG: u8 = b':';
pub const BULK_STRING_TAG: u8 = b'$';
pub const ARRAY_TAG: u8 = b'*';

/// Maximum bulk string payload (512 MB)
pub const MAX_BULK_LEN: usize = 512 * 1024 * 1024;

/// Maximum number of elements in one array
pub const MAX_ARRAY_LEN: usize = 1024 * 1024;

/// Maximum length of a header or simple line, terminator excluded (64 KB)
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// Maximum array nesting
pub const MAX_DEPTH: usize = 32;

// =============================================================================
// Encoding
// =============================================================================

/// Encode a value to its exact wire bytes
pub fn encode_value(value: &Value) -> Bytes {
    let mut buf = BytesMut::new();
    encode_into(value, &mut buf);
    buf.freeze()
}

/// Append the wire bytes of `value` to `buf`
pub fn encode_into(value: &Value, buf: &mut BytesMut) {
    match value {
        Value::SimpleString(text) => put_line(buf, SIMPLE_STRING_TAG, text.as_str().as_bytes()),
        Value::Error(text) => put_line(buf, ERROR_TAG, text.as_str().as_bytes()),
        Value::Integer(n) => put_line(buf, INTEGER_TAG, n.to_string().as_bytes()),
        Value::BulkString(data) => {
            put_line(buf, BULK_STRING_TAG, data.len().to_string().as_bytes());
            buf.reserve(data.len() + CRLF.len());
            buf.put_slice(data);
            buf.put_slice(CRLF);
        }
        Value::Null => buf.put_slice(b"$-1\r\n"),
        Value::Array(items) => {
            put_line(buf, ARRAY_TAG, items.len().to_string().as_bytes());
            for item in items {
                encode_into(item, buf);
            }
        }
    }
}

fn put_line(buf: &mut BytesMut, tag: u8, body: &[u8]) {
    buf.reserve(1 + body.len() + CRLF.len());
    buf.put_u8(tag);
    buf.put_slice(body);
    buf.put_slice(CRLF);
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode exactly one complete value from `bytes`.
///
/// Trailing bytes after the value are an error.
pub fn decode_value(bytes: &[u8]) -> Result<Value> {
    let mut cursor = bytes;
    let value = read_value(&mut cursor)?
        .ok_or_else(|| KvError::MalformedInput("empty input".to_string()))?;

    if !cursor.is_empty() {
        return Err(KvError::MalformedInput(format!(
            "{} trailing bytes after value",
            cursor.len()
        )));
    }
    Ok(value)
}

/// Read one value from a buffered stream.
///
/// Returns `Ok(None)` when the stream ends cleanly before a value starts.
/// Consumes only the bytes of the value it returns.
pub fn read_value<R: BufRead>(reader: &mut R) -> Result<Option<Value>> {
    match read_tag(reader)? {
        Some(tag) => read_tagged(reader, tag, 0).map(Some),
        None => Ok(None),
    }
}

fn read_tag<R: BufRead>(reader: &mut R) -> Result<Option<u8>> {
    loop {
        let buf = match reader.fill_buf() {
            Ok(buf) => buf,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        let Some(&tag) = buf.first() else {
            return Ok(None);
        };
        reader.consume(1);
        return Ok(Some(tag));
    }
}

fn read_tagged<R: BufRead>(reader: &mut R, tag: u8, depth: usize) -> Result<Value> {
    match tag {
        SIMPLE_STRING_TAG => Ok(Value::SimpleString(read_text(reader)?)),
        ERROR_TAG => Ok(Value::Error(read_text(reader)?)),
        INTEGER_TAG => {
            let line = read_line(reader)?;
            Ok(Value::Integer(parse_integer(&line)?))
        }
        BULK_STRING_TAG => read_bulk(reader),
        ARRAY_TAG => read_array(reader, depth),
        other => Err(KvError::MalformedInput(format!(
            "unknown type tag 0x{:02x}",
            other
        ))),
    }
}

fn read_bulk<R: BufRead>(reader: &mut R) -> Result<Value> {
    let Some(len) = read_length(reader, MAX_BULK_LEN, "bulk string")? else {
        return Ok(Value::Null);
    };

    let mut data = Vec::with_capacity(len.min(64 * 1024));
    reader.by_ref().take(len as u64).read_to_end(&mut data)?;
    if data.len() < len {
        return Err(KvError::MalformedInput(format!(
            "bulk string truncated: expected {} bytes, got {}",
            len,
            data.len()
        )));
    }

    let mut terminator = [0u8; 2];
    reader.read_exact(&mut terminator).map_err(truncated)?;
    if terminator != CRLF {
        return Err(KvError::MalformedInput(format!(
            "bulk string of declared length {} not followed by CRLF",
            len
        )));
    }

    Ok(Value::BulkString(Bytes::from(data)))
}

fn read_array<R: BufRead>(reader: &mut R, depth: usize) -> Result<Value> {
    if depth >= MAX_DEPTH {
        return Err(KvError::MalformedInput(format!(
            "array nesting deeper than {}",
            MAX_DEPTH
        )));
    }

    let Some(count) = read_length(reader, MAX_ARRAY_LEN, "array")? else {
        return Ok(Value::Null);
    };

    let mut items = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        let tag = read_tag(reader)?.ok_or_else(|| {
            KvError::MalformedInput(format!(
                "array truncated: expected {} elements, got {}",
                count,
                items.len()
            ))
        })?;
        items.push(read_tagged(reader, tag, depth + 1)?);
    }

    Ok(Value::Array(items))
}

/// Read a length header. `-1` means null.
fn read_length<R: BufRead>(reader: &mut R, max: usize, what: &str) -> Result<Option<usize>> {
    let line = read_line(reader)?;
    let n = parse_integer(&line)?;

    match n {
        -1 => Ok(None),
        n if n < 0 => Err(KvError::MalformedInput(format!(
            "invalid {} length {}",
            what, n
        ))),
        n if n as u64 > max as u64 => Err(KvError::MalformedInput(format!(
            "{} length {} exceeds maximum {}",
            what, n, max
        ))),
        n => Ok(Some(n as usize)),
    }
}

fn read_text<R: BufRead>(reader: &mut R) -> Result<Line> {
    let line = read_line(reader)?;
    let text = String::from_utf8(line)
        .map_err(|_| KvError::MalformedInput("line is not valid UTF-8".to_string()))?;
    Line::new(text).map_err(|e| KvError::MalformedInput(e.to_string()))
}

/// Read bytes up to `\r\n` and return them without the terminator
fn read_line<R: BufRead>(reader: &mut R) -> Result<Vec<u8>> {
    let mut line = Vec::new();

    loop {
        let remaining = (MAX_LINE_LEN + CRLF.len()).saturating_sub(line.len());
        if remaining == 0 {
            return Err(KvError::MalformedInput(format!(
                "line longer than {} bytes",
                MAX_LINE_LEN
            )));
        }

        let n = reader
            .by_ref()
            .take(remaining as u64)
            .read_until(b'\n', &mut line)?;

        if line.ends_with(CRLF) {
            line.truncate(line.len() - CRLF.len());
            return Ok(line);
        }
        if n == 0 || (line.last() != Some(&b'\n') && line.len() < MAX_LINE_LEN + CRLF.len()) {
            return Err(KvError::MalformedInput(
                "line truncated: no CRLF terminator".to_string(),
            ));
        }
        // A bare LF is part of the line; keep reading.
    }
}

/// Base-10 integer with at most a single leading `-`
fn parse_integer(line: &[u8]) -> Result<i64> {
    std::str::from_utf8(line)
        .ok()
        .filter(|s| !s.starts_with('+'))
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| {
            KvError::MalformedInput(format!(
                "invalid integer {:?}",
                String::from_utf8_lossy(line)
            ))
        })
}

fn truncated(e: io::Error) -> KvError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        KvError::MalformedInput("unexpected end of stream".to_string())
    } else {
        KvError::Io(e)
    }
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Write a value to a stream
pub fn write_value<W: Write>(writer: &mut W, value: &Value) -> Result<()> {
    writer.write_all(&encode_value(value))?;
    writer.flush()?;
    Ok(())
}
