//! Network Module
//!
//! TCP server, per-connection sessions and a blocking client.
//!
//! ## Architecture
//! - Single acceptor loop
//! - One thread per connection (or exactly one client in `Single` mode)
//! - Requests routed through Engine

mod server;
mod connection;
mod client;

pub use server::{Server, ServerExit};
pub use connection::{Connection, SessionEnd};
pub use client::Client;
