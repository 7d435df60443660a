//! Tests for the background flusher

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use respkv::aof::{AppendOnlyLog, Flusher};
use respkv::config::AofSyncPolicy;
use respkv::protocol::Value;
use tempfile::TempDir;

#[test]
fn test_flusher_runs_alongside_appends() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("flush.aof");
    let aof = Arc::new(AppendOnlyLog::open(&path, AofSyncPolicy::Periodic { interval_ms: 5 }).unwrap());

    let flusher = Flusher::spawn(Arc::clone(&aof), Duration::from_millis(5)).unwrap();
    for i in 0..20 {
        aof.append(&Value::command(["SET".to_string(), format!("k{}", i), "v".to_string()]))
            .unwrap();
        thread::sleep(Duration::from_millis(1));
    }
    flusher.stop();

    let stats = aof.replay(|_| Ok(())).unwrap();
    assert_eq!(stats.entries_replayed, 20);
}

#[test]
fn test_flusher_stops_on_drop() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("flush.aof");
    let aof = Arc::new(AppendOnlyLog::open(&path, AofSyncPolicy::EVERY_SECOND).unwrap());

    {
        let _flusher = Flusher::spawn(Arc::clone(&aof), Duration::from_secs(60)).unwrap();
    }

    // The thread held the only other reference; it is gone after drop.
    assert_eq!(Arc::strong_count(&aof), 1);
}
