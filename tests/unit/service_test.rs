//! Tests for the ticketing service

use std::sync::Arc;
use ticket_pool::config::TicketingConfig;
use ticket_pool::core::PoolError;
use ticket_pool::infra::{InMemoryConfigStore, MemorySink};
use ticket_pool::runtime::TicketingService;

fn service() -> (TicketingService<InMemoryConfigStore>, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::default());
    (
        TicketingService::new(InMemoryConfigStore::new(), sink.clone()),
        sink,
    )
}

fn quick_config() -> TicketingConfig {
    TicketingConfig {
        total_tickets: 4,
        max_ticket_capacity: 10,
        num_vendors: 2,
        num_customers: 1,
        ticket_release_interval_ms: 60_000,
        customer_retrieval_interval_ms: 60_000,
        ..TicketingConfig::default()
    }
}

#[test]
fn test_idle_service() {
    let (svc, _) = service();
    assert_eq!(svc.ticket_count(), 0);
    let status = svc.status();
    assert!(!status.running);
    assert_eq!(status.capacity, None);
    assert!(svc.pool().is_none());
    // Stopping with nothing to stop is fine.
    svc.stop().unwrap();
}

#[test]
fn test_start_and_stop() {
    let (svc, sink) = service();
    let message = svc.start(&quick_config()).unwrap();
    assert_eq!(
        message,
        "Ticketing system started with 2 vendors and 1 customers."
    );

    let status = svc.status();
    assert!(status.running);
    assert_eq!(status.capacity, Some(10));
    assert!(status.run_id.is_some());

    svc.stop().unwrap();
    assert!(!svc.status().running);
    // Stop twice is a no-op.
    svc.stop().unwrap();
    assert!(sink.messages().iter().any(|m| m == "Ticketing system stopped."));
}

#[test]
fn test_second_start_while_running_fails() {
    let (svc, _) = service();
    svc.start(&quick_config()).unwrap();
    let run_id = svc.status().run_id;

    let err = svc.start(&quick_config()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PoolError>(),
        Some(PoolError::AlreadyRunning)
    ));
    assert_eq!(svc.status().run_id, run_id);
    svc.stop().unwrap();
}

#[test]
fn test_restart_builds_fresh_pool() {
    let (svc, _) = service();
    svc.start(&quick_config()).unwrap();
    let first = svc.pool().unwrap();
    svc.stop().unwrap();

    svc.start(&TicketingConfig {
        total_tickets: 1,
        ..quick_config()
    })
    .unwrap();
    let second = svc.pool().unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(second.capacity(), 10);
    svc.stop().unwrap();
}

#[test]
fn test_invalid_config_is_reported() {
    let (svc, _) = service();
    let err = svc
        .start(&TicketingConfig {
            max_ticket_capacity: 0,
            ..quick_config()
        })
        .unwrap_err();
    assert!(format!("{err:#}").contains("capacity must be greater than 0"));
    assert!(!svc.status().running);
}

#[test]
fn test_saved_config_round_trip_and_start() {
    let (svc, _) = service();
    assert!(svc.load_config().unwrap().is_none());
    assert!(svc.start_saved().is_err());

    let saved = svc.save_config(&quick_config()).unwrap();
    assert_eq!(saved.id, 1);
    assert_eq!(svc.load_config().unwrap(), Some(quick_config()));

    svc.start_saved().unwrap();
    assert!(svc.status().running);
    svc.stop().unwrap();
}

#[test]
fn test_save_rejects_invalid_config() {
    let (svc, _) = service();
    let bad = TicketingConfig {
        total_tickets: 11,
        ..quick_config()
    };
    assert!(svc.save_config(&bad).is_err());
    assert!(svc.load_config().unwrap().is_none());
}
