//! Tests for pool builders

use std::sync::Arc;
use std::time::Duration;
use ticket_pool::builders::{build_pool, TicketPoolBuilder};
use ticket_pool::config::TicketingConfig;
use ticket_pool::core::{CancellationToken, PoolError, RemovalPolicy, TracingSink};
use ticket_pool::infra::MemorySink;

#[test]
fn test_builder_defaults() {
    let pool = TicketPoolBuilder::new(10).build().unwrap();
    assert_eq!(pool.capacity(), 10);
    assert_eq!(pool.ticket_count(), 0);
    assert_eq!(pool.removal_policy(), RemovalPolicy::Partial);
    assert!(!pool.is_running());
}

#[test]
fn test_builder_sets_every_field() {
    let sink = Arc::new(MemorySink::default());
    let pool = TicketPoolBuilder::new(4)
        .initial_count(2)
        .removal_policy(RemovalPolicy::WaitForFull)
        .stop_grace(Duration::from_millis(200))
        .sink(sink.clone())
        .build()
        .unwrap();

    assert_eq!(pool.ticket_count(), 2);
    assert_eq!(pool.removal_policy(), RemovalPolicy::WaitForFull);

    pool.add_tickets(1, &CancellationToken::new()).unwrap();
    assert_eq!(sink.len(), 1);
}

#[test]
fn test_builder_rejects_invalid_limits() {
    assert!(matches!(
        TicketPoolBuilder::new(0).build(),
        Err(PoolError::InvalidConfiguration(_))
    ));
    assert!(matches!(
        TicketPoolBuilder::new(3).initial_count(4).build(),
        Err(PoolError::InvalidConfiguration(_))
    ));
}

#[test]
fn test_build_pool_from_config() {
    let cfg = TicketingConfig {
        total_tickets: 7,
        max_ticket_capacity: 9,
        ..TicketingConfig::default()
    };
    let pool = build_pool(&cfg, Arc::new(TracingSink)).unwrap();
    assert_eq!(pool.ticket_count(), 7);
    assert_eq!(pool.capacity(), 9);
}

#[test]
fn test_build_pool_rejects_invalid_config() {
    let cfg = TicketingConfig {
        stop_grace_ms: 0,
        ..TicketingConfig::default()
    };
    assert!(matches!(
        build_pool(&cfg, Arc::new(TracingSink)),
        Err(PoolError::InvalidConfiguration(_))
    ));
}
