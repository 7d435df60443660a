//! StringStore Tests
//!
//! Tests verify:
//! - Basic set/get
//! - Absent vs empty values
//! - Byte-exact, case-sensitive keys
//! - Concurrent access patterns

use std::sync::Arc;
use std::thread;

use bytes::Bytes;
use respkv::store::StringStore;

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_new_store_is_empty() {
    let store = StringStore::new();
    assert!(store.is_empty());
    assert_eq!(store.len(), 0);
}

#[test]
fn test_set_and_get() {
    let store = StringStore::new();

    store.set(Bytes::from("key1"), Bytes::from("value1"));

    assert_eq!(store.get(b"key1"), Some(Bytes::from("value1")));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_get_nonexistent_key() {
    let store = StringStore::new();
    assert_eq!(store.get(b"missing"), None);
}

#[test]
fn test_set_overwrites_existing() {
    let store = StringStore::new();

    store.set(Bytes::from("key"), Bytes::from("old"));
    store.set(Bytes::from("key"), Bytes::from("new"));

    assert_eq!(store.get(b"key"), Some(Bytes::from("new")));
    assert_eq!(store.len(), 1);
}

// =============================================================================
// Edge Cases
// =============================================================================

#[test]
fn test_empty_value_is_present() {
    let store = StringStore::new();

    store.set(Bytes::from("key"), Bytes::new());

    assert!(store.contains(b"key"));
    assert_eq!(store.get(b"key"), Some(Bytes::new()));
}

#[test]
fn test_keys_are_case_sensitive() {
    let store = StringStore::new();

    store.set(Bytes::from("Key"), Bytes::from("upper"));

    assert_eq!(store.get(b"key"), None);
    assert_eq!(store.get(b"Key"), Some(Bytes::from("upper")));
}

#[test]
fn test_binary_key_and_value() {
    let store = StringStore::new();
    let key = Bytes::from(vec![0x00, 0xFF, b'\r', b'\n']);
    let value = Bytes::from((0..=255).collect::<Vec<u8>>());

    store.set(key.clone(), value.clone());

    assert_eq!(store.get(&key), Some(value));
}

// =============================================================================
// Concurrent Access Tests
// =============================================================================

#[test]
fn test_concurrent_writes_disjoint_keys() {
    let store = Arc::new(StringStore::new());

    let mut handles = vec![];
    for t in 0..8 {
        let store = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            for i in 0..100 {
                store.set(
                    Bytes::from(format!("t{}_k{}", t, i)),
                    Bytes::from(format!("t{}_v{}", t, i)),
                );
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.len(), 800);
    for t in 0..8 {
        for i in 0..100 {
            let key = format!("t{}_k{}", t, i);
            assert_eq!(
                store.get(key.as_bytes()),
                Some(Bytes::from(format!("t{}_v{}", t, i)))
            );
        }
    }
}

#[test]
fn test_concurrent_writes_same_key() {
    let store = Arc::new(StringStore::new());
    let candidates: Vec<Bytes> = (0..8).map(|t| Bytes::from(vec![b'a' + t as u8; 64])).collect();

    let mut handles = vec![];
    for value in candidates.clone() {
        let store = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            for _ in 0..200 {
                store.set(Bytes::from_static(b"shared"), value.clone());
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let final_value = store.get(b"shared").unwrap();
    assert!(candidates.contains(&final_value));
}

#[test]
fn test_concurrent_reads() {
    let store = Arc::new(StringStore::new());
    store.set(Bytes::from("key"), Bytes::from("value"));

    let mut handles = vec![];
    for _ in 0..10 {
        let store = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            for _ in 0..100 {
                assert_eq!(store.get(b"key"), Some(Bytes::from("value")));
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
}
