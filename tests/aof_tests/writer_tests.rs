//! Tests for AppendOnlyLog
//!
//! These tests verify:
//! - Appended bytes are exactly the wire encoding
//! - Opening never truncates
//! - Concurrent appends never interleave

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use respkv::aof::AppendOnlyLog;
use respkv::config::AofSyncPolicy;
use respkv::protocol::{encode_value, Value};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_aof() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let aof_path = temp_dir.path().join("test.aof");
    (temp_dir, aof_path)
}

// =============================================================================
// Basic Writing Tests
// =============================================================================

#[test]
fn test_open_creates_file() {
    let (_temp, aof_path) = setup_temp_aof();

    let aof = AppendOnlyLog::open(&aof_path, AofSyncPolicy::EveryWrite).unwrap();

    assert!(aof_path.exists());
    assert!(aof.is_empty().unwrap());
    assert_eq!(aof.path(), aof_path.as_path());
    assert_eq!(aof.sync_policy(), AofSyncPolicy::EveryWrite);
    assert!(!aof.is_poisoned());
}

#[test]
fn test_append_writes_wire_bytes() {
    let (_temp, aof_path) = setup_temp_aof();
    let aof = AppendOnlyLog::open(&aof_path, AofSyncPolicy::EveryWrite).unwrap();

    aof.append(&Value::command(["SET", "a", "1"])).unwrap();

    assert_eq!(
        fs::read(&aof_path).unwrap(),
        b"*3\r\n$3\r\nSET\r\n$1\r\na\r\n$1\r\n1\r\n"
    );
}

#[test]
fn test_append_in_order() {
    let (_temp, aof_path) = setup_temp_aof();
    let aof = AppendOnlyLog::open(&aof_path, AofSyncPolicy::EVERY_SECOND).unwrap();

    let first = Value::command(["SET", "k", "1"]);
    let second = Value::command(["HSET", "h", "f", "v"]);
    aof.append(&first).unwrap();
    aof.append(&second).unwrap();
    aof.sync().unwrap();

    let mut expected = encode_value(&first).to_vec();
    expected.extend_from_slice(&encode_value(&second));
    assert_eq!(fs::read(&aof_path).unwrap(), expected);
    assert_eq!(aof.len().unwrap(), expected.len() as u64);
}

#[test]
fn test_reopen_does_not_truncate() {
    let (_temp, aof_path) = setup_temp_aof();

    {
        let aof = AppendOnlyLog::open(&aof_path, AofSyncPolicy::EveryWrite).unwrap();
        aof.append(&Value::command(["SET", "a", "1"])).unwrap();
    }
    let before = fs::read(&aof_path).unwrap();

    let aof = AppendOnlyLog::open(&aof_path, AofSyncPolicy::EveryWrite).unwrap();
    assert_eq!(fs::read(&aof_path).unwrap(), before);

    aof.append(&Value::command(["SET", "b", "2"])).unwrap();
    let after = fs::read(&aof_path).unwrap();
    assert!(after.starts_with(&before));
    assert!(after.len() > before.len());
}

#[test]
fn test_open_in_missing_directory_fails() {
    let (temp, _) = setup_temp_aof();
    let path = temp.path().join("no_such_dir").join("test.aof");

    assert!(AppendOnlyLog::open(&path, AofSyncPolicy::EveryWrite).is_err());
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_appends_do_not_interleave() {
    let (_temp, aof_path) = setup_temp_aof();
    let aof = Arc::new(AppendOnlyLog::open(&aof_path, AofSyncPolicy::EVERY_SECOND).unwrap());

    let mut handles = vec![];
    for t in 0..8 {
        let aof = Arc::clone(&aof);
        handles.push(thread::spawn(move || {
            for i in 0..50 {
                let value = "x".repeat(100 + i);
                aof.append(&Value::command([
                    "SET".to_string(),
                    format!("t{}_{}", t, i),
                    value,
                ]))
                .unwrap();
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    // Every entry must decode on its own: no torn or mixed byte ranges
    let mut count = 0;
    aof.replay(|value| {
        let items = value.as_array().expect("entry is an array");
        assert_eq!(items.len(), 3);
        count += 1;
        Ok(())
    })
    .unwrap();
    assert_eq!(count, 400);
}
