//! Protocol Module
//!
//! Defines the wire protocol for client-server communication (RESP).
//!
//! ## Request Format
//! Every request is an array of bulk strings, command name first:
//! ```text
//! *3\r\n$3\r\nSET\r\n$1\r\na\r\n$1\r\n1\r\n
//! ```
//!
//! ## Replies
//! Any value shape:
//! - `+OK\r\n`, `+PONG\r\n`          simple strings
//! - `-ERR ...\r\n`                  errors
//! - `$1\r\n1\r\n`, `$-1\r\n`        bulk string / null
//! - `*2\r\n...`                     arrays (HGETALL)

mod value;
mod command;
mod codec;

pub use value::{Line, Value};
pub use command::{Arity, CommandKind, Request, EXIT_COMMAND};
pub use codec::{
    decode_value, encode_into, encode_value, read_value, write_value, CRLF, MAX_ARRAY_LEN,
    MAX_BULK_LEN, MAX_LINE_LEN,
};
