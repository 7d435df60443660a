//! Blocking client
//!
//! Sends requests as arrays of bulk strings and reads one reply each.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};

use bytes::Bytes;

use crate::error::{KvError, Result};
use crate::protocol::{read_value, write_value, Value};

/// A connection to a respkv (or any RESP) server
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    /// Connect to `addr`
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;

        Ok(Self {
            reader: BufReader::new(stream.try_clone()?),
            writer: BufWriter::new(stream),
        })
    }

    /// Send a command and wait for its reply
    pub fn command<I, T>(&mut self, parts: I) -> Result<Value>
    where
        I: IntoIterator<Item = T>,
        T: Into<Bytes>,
    {
        self.send(&Value::command(parts))?;
        self.read_reply()
    }

    /// Send any value without waiting
    pub fn send(&mut self, value: &Value) -> Result<()> {
        write_value(&mut self.writer, value)
    }

    /// Read the next reply
    pub fn read_reply(&mut self) -> Result<Value> {
        read_value(&mut self.reader)?
            .ok_or_else(|| KvError::Network("connection closed by server".to_string()))
    }
}
