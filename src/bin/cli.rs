//! respkv CLI Client
//!
//! Command-line interface for interacting with respkv.

use clap::{Parser, Subcommand};
use respkv::network::Client;
use respkv::Value;

/// respkv CLI
#[derive(Parser, Debug)]
#[command(name = "respkv-cli")]
#[command(about = "CLI for the respkv key-value store")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:6379")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ping the server
    Ping {
        /// Optional message to echo
        message: Option<String>,
    },

    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Set a field of a hash
    Hset {
        hash: String,
        field: String,
        value: String,
    },

    /// Get a field of a hash
    Hget { hash: String, field: String },

    /// Get all fields and values of a hash
    Hgetall { hash: String },

    /// Send any command as-is
    Raw {
        /// Command name followed by its arguments
        #[arg(required = true)]
        parts: Vec<String>,
    },
}

impl Commands {
    fn into_parts(self) -> Vec<String> {
        match self {
            Commands::Ping { message } => {
                let mut parts = vec!["PING".to_string()];
                parts.extend(message);
                parts
            }
            Commands::Get { key } => vec!["GET".into(), key],
            Commands::Set { key, value } => vec!["SET".into(), key, value],
            Commands::Hset { hash, field, value } => vec!["HSET".into(), hash, field, value],
            Commands::Hget { hash, field } => vec!["HGET".into(), hash, field],
            Commands::Hgetall { hash } => vec!["HGETALL".into(), hash],
            Commands::Raw { parts } => parts,
        }
    }
}

fn main() {
    let args = Args::parse();

    let mut client = match Client::connect(&args.server) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Could not connect to {}: {}", args.server, e);
            std::process::exit(1);
        }
    };

    match client.command(args.command.into_parts()) {
        Ok(reply) => {
            let failed = reply.is_error();
            println!("{}", render(&reply, 0));
            if failed {
                std::process::exit(2);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Format a reply the way redis-cli does
fn render(value: &Value, indent: usize) -> String {
    match value {
        Value::SimpleString(s) => s.to_string(),
        Value::Error(e) => format!("(error) {}", e),
        Value::Integer(n) => format!("(integer) {}", n),
        Value::BulkString(b) => format!("{:?}", String::from_utf8_lossy(b)),
        Value::Null => "(nil)".to_string(),
        Value::Array(items) if items.is_empty() => "(empty array)".to_string(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let pad = if i == 0 { String::new() } else { " ".repeat(indent) };
                format!("{}{}) {}", pad, i + 1, render(item, indent + 3))
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}
