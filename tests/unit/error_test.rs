//! Tests for error types and messages

use std::time::Duration;
use ticket_pool::core::{PoolError, StoreError};

#[test]
fn test_pool_error_messages() {
    assert_eq!(
        PoolError::InvalidConfiguration("capacity must be greater than 0".into()).to_string(),
        "invalid configuration: capacity must be greater than 0"
    );
    assert_eq!(
        PoolError::ExceedsCapacity {
            requested: 12,
            capacity: 10
        }
        .to_string(),
        "requested 12 tickets but capacity is 10"
    );
    assert_eq!(
        PoolError::AlreadyRunning.to_string(),
        "ticketing system is already running"
    );
    assert_eq!(
        PoolError::NotRunning.to_string(),
        "ticketing system is not running"
    );
    assert_eq!(PoolError::Cancelled.to_string(), "operation cancelled");
}

#[test]
fn test_worker_leak_lists_names() {
    let err = PoolError::WorkerLeak {
        workers: vec!["Customer 1".into(), "Vendor 2".into()],
        grace: Duration::from_millis(500),
    };
    assert_eq!(
        err.to_string(),
        "2 worker(s) failed to stop within 500ms: Customer 1, Vendor 2"
    );
}

#[test]
fn test_is_cancelled() {
    assert!(PoolError::Cancelled.is_cancelled());
    assert!(!PoolError::NotRunning.is_cancelled());
}

#[test]
fn test_spawn_error_from_io() {
    let io = std::io::Error::other("no threads left");
    let err: PoolError = io.into();
    assert!(matches!(err, PoolError::Spawn(_)));
    assert!(err.to_string().contains("no threads left"));
}

#[test]
fn test_store_error_from_serde() {
    let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err: StoreError = parse.into();
    assert!(err.to_string().starts_with("store serialization error"));
}

#[test]
fn test_pool_error_into_anyhow() {
    let err: anyhow::Error = PoolError::AlreadyRunning.into();
    assert!(matches!(
        err.downcast_ref::<PoolError>(),
        Some(PoolError::AlreadyRunning)
    ));
}
