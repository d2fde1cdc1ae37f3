//! Tests for configuration validation and loading

use std::collections::HashMap;
use std::time::Duration;
use ticket_pool::config::TicketingConfig;
use ticket_pool::core::RemovalPolicy;

#[test]
fn test_default_config() {
    let cfg = TicketingConfig::default();
    assert_eq!(cfg.max_ticket_capacity, 100);
    assert_eq!(cfg.num_vendors, 1);
    assert_eq!(cfg.removal_policy, RemovalPolicy::Partial);
    assert_eq!(cfg.release_interval(), Duration::from_secs(1));
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_zero_capacity_is_invalid() {
    let cfg = TicketingConfig {
        max_ticket_capacity: 0,
        ..TicketingConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_initial_above_capacity_is_invalid() {
    let cfg = TicketingConfig {
        total_tickets: 11,
        max_ticket_capacity: 10,
        ..TicketingConfig::default()
    };
    let err = cfg.validate().unwrap_err();
    assert!(err.contains("total_tickets"));
}

#[test]
fn test_no_workers_is_invalid() {
    let cfg = TicketingConfig {
        num_vendors: 0,
        num_customers: 0,
        ..TicketingConfig::default()
    };
    assert!(cfg.validate().unwrap_err().contains("vendor or customer"));

    let vendors_only = TicketingConfig {
        num_customers: 0,
        ..TicketingConfig::default()
    };
    assert!(vendors_only.validate().is_ok());
}

#[test]
fn test_zero_grace_is_invalid() {
    let cfg = TicketingConfig {
        stop_grace_ms: 0,
        ..TicketingConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn test_json_with_optional_fields_omitted() {
    let json = r#"{
        "total_tickets": 10,
        "max_ticket_capacity": 50,
        "num_vendors": 3,
        "num_customers": 2,
        "ticket_release_interval_ms": 500,
        "customer_retrieval_interval_ms": 750
    }"#;
    let cfg = TicketingConfig::from_json_str(json).unwrap();
    assert_eq!(cfg.total_tickets, 10);
    assert_eq!(cfg.retrieval_interval(), Duration::from_millis(750));
    assert_eq!(cfg.removal_policy, RemovalPolicy::Partial);
    assert_eq!(cfg.stop_grace_ms, 5_000);
}

#[test]
fn test_json_policy_and_invalid_values() {
    let json = r#"{
        "total_tickets": 0,
        "max_ticket_capacity": 5,
        "num_vendors": 1,
        "num_customers": 1,
        "ticket_release_interval_ms": 1,
        "customer_retrieval_interval_ms": 1,
        "removal_policy": "wait_for_full"
    }"#;
    assert_eq!(
        TicketingConfig::from_json_str(json).unwrap().removal_policy,
        RemovalPolicy::WaitForFull
    );

    let too_many = json.replace("\"total_tickets\": 0", "\"total_tickets\": 6");
    assert!(TicketingConfig::from_json_str(&too_many).is_err());
    assert!(TicketingConfig::from_json_str("not json")
        .unwrap_err()
        .starts_with("parse error"));
}

#[test]
fn test_lookup_unknown_policy() {
    let vars: HashMap<&str, &str> = [("TICKETING_REMOVAL_POLICY", "greedy")]
        .into_iter()
        .collect();
    let err = TicketingConfig::from_lookup(|k| vars.get(k).map(ToString::to_string)).unwrap_err();
    assert!(err.contains("unknown policy"));
}

#[test]
fn test_lookup_validates_result() {
    let vars: HashMap<&str, &str> = [
        ("TICKETING_TOTAL_TICKETS", "20"),
        ("TICKETING_MAX_TICKET_CAPACITY", "10"),
    ]
    .into_iter()
    .collect();
    assert!(TicketingConfig::from_lookup(|k| vars.get(k).map(ToString::to_string)).is_err());
}
