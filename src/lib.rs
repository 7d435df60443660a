//! # respkv
//!
//! A minimal in-memory key-value store with:
//! - RESP (Redis serialization protocol) over TCP
//! - Append-only command log (AOF) for durability
//! - Replay of the AOF through the live dispatch path on startup
//! - Per-store read/write locks for concurrent clients
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │            (Connection per thread, RESP codec)               │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ Request (array of bulk strings)
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Engine                                 │
//! │        (log mutating commands, then dispatch)                │
//! └──────────┬──────────────────────────────┬───────────────────┘
//!            │                              │
//!            ▼                              ▼
//!   ┌─────────────────┐            ┌─────────────────┐
//!   │       AOF       │  replay →  │   Dispatcher    │
//!   │ (append, fsync) │            │ (command table) │
//!   └─────────────────┘            └────────┬────────┘
//!                                           │
//!                              ┌────────────┴────────────┐
//!                              ▼                         ▼
//!                       ┌─────────────┐          ┌─────────────┐
//!                       │ StringStore │          │  HashStore  │
//!                       │  (RwLock)   │          │  (RwLock)   │
//!                       └─────────────┘          └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod store;
pub mod aof;
pub mod dispatch;
pub mod engine;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{KvError, Result};
pub use config::Config;
pub use engine::Engine;
pub use protocol::Value;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of respkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
