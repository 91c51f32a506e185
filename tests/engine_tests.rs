//! Tests for Engine
//!
//! These tests verify:
//! - The full table client scenario (put, putIfAbsent, delete, vPut, vDelete)
//! - Range and delete-range over numbered keys
//! - Counters through the engine
//! - Input validation and error codes
//! - Command execution
//! - Partition isolation and concurrent access

use std::sync::Arc;
use std::thread;

use bytes::Bytes;
use tablekv::protocol::{Command, Outcome};
use tablekv::{Code, Config, Engine, TableError};

// =============================================================================
// Helper Functions
// =============================================================================

fn lkey(i: usize) -> Vec<u8> {
    format!("test-lkey-{:06}", i).into_bytes()
}

fn value(i: usize) -> Vec<u8> {
    format!("test-val-{:06}", i).into_bytes()
}

// =============================================================================
// Table Scenario Tests
// =============================================================================

#[test]
fn test_table_simple_api() {
    let engine = Engine::default();
    let rkey = b"routing-key";
    let key = b"testing-key";
    let value1 = b"testing-value-1";
    let value2 = b"testing-value-2";

    // normal put
    engine.put(rkey, key, value1).unwrap();

    // putIfAbsent failure returns the current value
    let existing = engine.put_if_absent(rkey, key, value2).unwrap();
    assert_eq!(existing.as_deref(), Some(&value1[..]));

    // delete failure
    assert!(!engine.delete(rkey, key, value2).unwrap());

    // delete success
    assert!(engine.delete(rkey, key, value1).unwrap());

    // get
    assert_eq!(engine.get(rkey, key).unwrap(), None);

    // putIfAbsent success
    assert_eq!(engine.put_if_absent(rkey, key, value2).unwrap(), None);

    // get returns value2
    assert_eq!(engine.get(rkey, key).unwrap().as_deref(), Some(&value2[..]));

    // vPut failure
    let err = engine.v_put(rkey, key, value1, 9999).unwrap_err();
    assert_eq!(err.code(), Code::BadRevision);

    // vPut success
    assert_eq!(engine.v_put(rkey, key, value1, 0).unwrap(), 1);

    // vDelete failure
    let err = engine.v_delete(rkey, key, 9999).unwrap_err();
    assert_eq!(err.code(), Code::BadRevision);

    // vDelete success
    let mut prev = engine.v_delete(rkey, key, 1).unwrap();
    assert_eq!(prev.version(), 1);
    assert_eq!(prev.value().unwrap().as_ref(), &value1[..]);
    prev.release().unwrap();

    assert_eq!(engine.get(rkey, key).unwrap(), None);
    assert_eq!(engine.outstanding_results(), 0);
}

#[test]
fn test_range_and_delete_range_walk() {
    let engine = Engine::default();
    let rkey = b"test-key";

    for i in 0..100 {
        engine.put(rkey, &lkey(i), &value(i)).unwrap();
    }

    // get ranges
    let kvs = engine.range(rkey, &lkey(20), &lkey(50)).unwrap();
    assert_eq!(kvs.len(), 31);
    let mut i = 20;
    for mut kv in kvs {
        assert_eq!(kv.key().as_bytes(), &lkey(i)[..]);
        assert_eq!(kv.value().unwrap().as_ref(), &value(i)[..]);
        i += 1;
        kv.release().unwrap();
    }
    assert_eq!(i, 51);

    // delete range
    let kvs = engine.delete_range(rkey, &lkey(20), &lkey(50)).unwrap();
    assert_eq!(kvs.len(), 31);
    let mut i = 20;
    for mut kv in kvs {
        assert_eq!(kv.key().as_bytes(), &lkey(i)[..]);
        assert_eq!(kv.value().unwrap().as_ref(), &value(i)[..]);
        i += 1;
        kv.release().unwrap();
    }
    assert_eq!(i, 51);

    // get ranges again
    assert!(engine.range(rkey, &lkey(20), &lkey(50)).unwrap().is_empty());
    assert_eq!(engine.range(rkey, &lkey(0), &lkey(99)).unwrap().len(), 69);
    assert_eq!(engine.outstanding_results(), 0);
}

#[test]
fn test_increment_then_get_number() {
    let engine = Engine::default();
    let rkey = b"test-key";
    let key = b"test-incr-lkey";

    for j in 0..5 {
        engine.increment(rkey, key, 100).unwrap();
        assert_eq!(engine.get_number(rkey, key).unwrap(), 100 * (j + 1));
    }
}

// =============================================================================
// Version Bookkeeping Tests
// =============================================================================

#[test]
fn test_put_if_absent_does_not_change_version() {
    let engine = Engine::default();
    engine.put(b"r", b"k", b"v").unwrap();
    engine.put(b"r", b"k", b"v2").unwrap();

    engine.put_if_absent(b"r", b"k", b"other").unwrap();

    let record = engine.get_record(b"r", b"k").unwrap().unwrap();
    assert_eq!(record.version, 1);
    assert_eq!(record.value, Bytes::from_static(b"v2"));
}

#[test]
fn test_stale_v_put_retry_fails() {
    let engine = Engine::default();

    assert_eq!(engine.v_put(b"r", b"k", b"a", 0).unwrap(), 1);
    assert_eq!(engine.v_put(b"r", b"k", b"b", 1).unwrap(), 2);

    let err = engine.v_put(b"r", b"k", b"c", 1).unwrap_err();
    assert_eq!(
        err,
        TableError::BadRevision {
            expected: 1,
            current: Some(2)
        }
    );
}

#[test]
fn test_version_counts_mutations_after_create() {
    let engine = Engine::default();
    let n = 10;
    for i in 0..n {
        engine.put(b"r", b"k", format!("v{}", i).as_bytes()).unwrap();
    }

    let record = engine.get_record(b"r", b"k").unwrap().unwrap();
    assert_eq!(record.version, (n - 1) as u64);
}

// =============================================================================
// Missing Partition Tests
// =============================================================================

#[test]
fn test_reads_on_unknown_routing_key() {
    let engine = Engine::default();

    assert_eq!(engine.get(b"nowhere", b"k").unwrap(), None);
    assert!(!engine.delete(b"nowhere", b"k", b"v").unwrap());
    assert!(engine.range(b"nowhere", b"a", b"z").unwrap().is_empty());
    assert!(engine.delete_range(b"nowhere", b"a", b"z").unwrap().is_empty());
    assert_eq!(
        engine.get_number(b"nowhere", b"k").unwrap_err(),
        TableError::KeyNotFound
    );
    assert_eq!(
        engine.v_delete(b"nowhere", b"k", 0).unwrap_err().code(),
        Code::KeyNotFound
    );
    assert_eq!(
        engine.v_delete(b"nowhere", b"k", 5).unwrap_err().code(),
        Code::BadRevision
    );

    // None of the above counts as a first write
    assert_eq!(engine.partition_count(), 0);
}

#[test]
fn test_partitions_are_isolated() {
    let engine = Engine::default();

    engine.put(b"r1", b"k", b"one").unwrap();
    engine.put(b"r2", b"k", b"two").unwrap();

    assert_eq!(engine.get(b"r1", b"k").unwrap(), Some(Bytes::from_static(b"one")));
    assert_eq!(engine.get(b"r2", b"k").unwrap(), Some(Bytes::from_static(b"two")));

    engine.delete_range(b"r1", b"a", b"z").unwrap();
    assert_eq!(engine.get(b"r1", b"k").unwrap(), None);
    assert_eq!(engine.get(b"r2", b"k").unwrap(), Some(Bytes::from_static(b"two")));
    assert_eq!(engine.partition_count(), 2);
}

// =============================================================================
// Validation Tests
// =============================================================================

#[test]
fn test_empty_keys_rejected() {
    let engine = Engine::default();

    assert_eq!(engine.put(b"", b"k", b"v").unwrap_err().code(), Code::InvalidArgument);
    assert_eq!(engine.put(b"r", b"", b"v").unwrap_err().code(), Code::InvalidArgument);
    assert_eq!(engine.get(b"", b"k").unwrap_err().code(), Code::InvalidArgument);
    assert_eq!(engine.range(b"r", b"", b"z").unwrap_err().code(), Code::InvalidArgument);
    assert_eq!(engine.partition_count(), 0);
}

#[test]
fn test_negative_expected_version_rejected() {
    let engine = Engine::default();
    engine.put(b"r", b"k", b"v").unwrap();

    assert_eq!(
        engine.v_put(b"r", b"k", b"v2", -1).unwrap_err().code(),
        Code::InvalidArgument
    );
    assert_eq!(
        engine.v_delete(b"r", b"k", -1).unwrap_err().code(),
        Code::InvalidArgument
    );
    assert_eq!(engine.get(b"r", b"k").unwrap(), Some(Bytes::from_static(b"v")));
}

#[test]
fn test_inverted_range_rejected() {
    let engine = Engine::default();
    engine.put(b"r", b"m", b"v").unwrap();

    assert_eq!(engine.range(b"r", b"z", b"a").unwrap_err().code(), Code::InvalidArgument);
    assert_eq!(
        engine.delete_range(b"r", b"z", b"a").unwrap_err().code(),
        Code::InvalidArgument
    );
    assert_eq!(engine.get(b"r", b"m").unwrap(), Some(Bytes::from_static(b"v")));
}

#[test]
fn test_negative_delta_policy() {
    let permissive = Engine::default();
    permissive.increment(b"r", b"c", 5).unwrap();
    assert_eq!(permissive.increment(b"r", b"c", -2).unwrap(), 3);

    let strict = Engine::new(Config::builder().allow_negative_delta(false).build());
    strict.increment(b"r", b"c", 5).unwrap();
    let err = strict.increment(b"r", b"c", -2).unwrap_err();
    assert_eq!(err.code(), Code::InvalidArgument);
    assert_eq!(strict.get_number(b"r", b"c").unwrap(), 5);
}

// =============================================================================
// Command Execution Tests
// =============================================================================

#[test]
fn test_execute_put_and_get() {
    let engine = Engine::default();

    let outcome = engine
        .execute(Command::Put {
            routing_key: Bytes::from_static(b"r"),
            key: Bytes::from_static(b"k"),
            value: Bytes::from_static(b"v"),
        })
        .unwrap();
    assert!(matches!(outcome, Outcome::Done));

    let outcome = engine
        .execute(Command::Get {
            routing_key: Bytes::from_static(b"r"),
            key: Bytes::from_static(b"k"),
        })
        .unwrap();
    assert_eq!(outcome.into_value().unwrap(), Some(Bytes::from_static(b"v")));
}

#[test]
fn test_execute_v_put_returns_version() {
    let engine = Engine::default();

    let outcome = engine
        .execute(Command::VPut {
            routing_key: Bytes::from_static(b"r"),
            key: Bytes::from_static(b"k"),
            value: Bytes::from_static(b"v"),
            expected_version: 0,
        })
        .unwrap();

    assert!(matches!(outcome, Outcome::Version(1)));
}

#[test]
fn test_execute_get_number() {
    let engine = Engine::default();
    engine.increment(b"r", b"c", 9).unwrap();

    let outcome = engine
        .execute(Command::GetNumber {
            routing_key: Bytes::from_static(b"r"),
            key: Bytes::from_static(b"c"),
        })
        .unwrap();

    assert_eq!(outcome.into_number().unwrap(), 9);
}

#[test]
fn test_outcome_kind_mismatch() {
    let err = Outcome::Done.into_number().unwrap_err();
    assert!(matches!(err, TableError::Protocol(_)));
}

// =============================================================================
// Concurrent Access Tests
// =============================================================================

#[test]
fn test_engine_concurrent_increments() {
    let engine = Arc::new(Engine::default());
    let mut handles = vec![];

    for _ in 0..4 {
        let engine = Arc::clone(&engine);
        handles.push(thread::spawn(move || {
            for _ in 0..100 {
                engine.increment(b"r", b"counter", 5).unwrap();
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(engine.get_number(b"r", b"counter").unwrap(), 2000);
}

#[test]
fn test_engine_concurrent_put_if_absent_single_winner() {
    let engine = Arc::new(Engine::default());
    let mut handles = vec![];

    for t in 0..8 {
        let engine = Arc::clone(&engine);
        handles.push(thread::spawn(move || {
            let mine = format!("writer-{}", t);
            engine
                .put_if_absent(b"r", b"k", mine.as_bytes())
                .unwrap()
                .is_none()
        }));
    }

    let winners = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|won| *won)
        .count();

    assert_eq!(winners, 1);
}

#[test]
fn test_engine_concurrent_routing_keys() {
    let engine = Arc::new(Engine::default());
    let mut handles = vec![];

    for t in 0..4 {
        let engine = Arc::clone(&engine);
        handles.push(thread::spawn(move || {
            let rkey = format!("route-{}", t);
            for i in 0..50 {
                engine.put(rkey.as_bytes(), &lkey(i), &value(i)).unwrap();
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(engine.partition_count(), 4);
    for t in 0..4 {
        let rkey = format!("route-{}", t);
        let kvs = engine.range(rkey.as_bytes(), &lkey(0), &lkey(49)).unwrap();
        assert_eq!(kvs.len(), 50);
    }
}
