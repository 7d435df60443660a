//! respkv Server Binary
//!
//! Replays the AOF and starts the TCP server.

use std::sync::Arc;

use clap::{Parser, ValueEnum};
use respkv::aof;
use respkv::config::{AcceptMode, AofSyncPolicy, ExitBehavior};
use respkv::network::{Server, ServerExit};
use respkv::{Config, Engine};
use tracing_subscriber::{fmt, EnvFilter};

/// respkv Server
#[derive(Parser, Debug)]
#[command(name = "respkv-server")]
#[command(about = "In-memory RESP key-value store with an append-only log")]
#[command(version)]
struct Args {
    /// Data directory (holds database.aof)
    #[arg(short, long, default_value = "./respkv_data")]
    data_dir: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:6379")]
    listen: String,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// When to fsync the AOF
    #[arg(long, value_enum, default_value = "everysec")]
    fsync: FsyncArg,

    /// Serve exactly one client, then stop
    #[arg(long)]
    single_client: bool,

    /// Make EXIT stop the whole server (exit status 1)
    #[arg(long)]
    exit_terminates_process: bool,

    /// Verify the AOF and exit without serving
    #[arg(long)]
    check_aof: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FsyncArg {
    /// fsync after every append
    Always,
    /// fsync once per second
    Everysec,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,respkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("respkv Server v{}", respkv::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);

    if args.check_aof {
        let config = Config::builder().data_dir(&args.data_dir).build();
        match aof::verify(&config.aof_path()) {
            Ok(stats) => {
                tracing::info!(
                    "AOF OK: {} entries, {} bytes",
                    stats.entries_replayed,
                    stats.bytes_read
                );
                return;
            }
            Err(e) => {
                tracing::error!("AOF check failed: {}", e);
                std::process::exit(1);
            }
        }
    }

    // Build config from args
    let config = Config::builder()
        .data_dir(&args.data_dir)
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .aof_sync_policy(match args.fsync {
            FsyncArg::Always => AofSyncPolicy::EveryWrite,
            FsyncArg::Everysec => AofSyncPolicy::EVERY_SECOND,
        })
        .accept_mode(if args.single_client {
            AcceptMode::Single
        } else {
            AcceptMode::Concurrent
        })
        .exit_behavior(if args.exit_terminates_process {
            ExitBehavior::Process
        } else {
            ExitBehavior::CloseConnection
        })
        .build();

    // Open engine (replays the AOF)
    let engine = match Engine::open(config.clone()) {
        Ok(e) => Arc::new(e),
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Engine initialized successfully");

    let server = match Server::bind(config, Arc::clone(&engine)) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    let exit = match server.run() {
        Ok(exit) => exit,
        Err(e) => {
            tracing::error!("Server error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = engine.close() {
        tracing::error!("Failed to close engine: {}", e);
    }

    match exit {
        ServerExit::ExitCommand => {
            tracing::info!("Stopped by EXIT");
            std::process::exit(1);
        }
        ServerExit::Shutdown | ServerExit::ClientLeft => tracing::info!("Server stopped"),
    }
}
