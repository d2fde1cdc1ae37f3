//! Tests for configuration stores

use ticket_pool::config::TicketingConfig;
use ticket_pool::core::StoreError;
use ticket_pool::infra::{ConfigStore, InMemoryConfigStore, JsonFileConfigStore};

fn sample(vendors: usize) -> TicketingConfig {
    TicketingConfig {
        total_tickets: 5,
        max_ticket_capacity: 20,
        num_vendors: vendors,
        ..TicketingConfig::default()
    }
}

#[test]
fn test_memory_store_updates_in_place() {
    let store = InMemoryConfigStore::new();
    assert_eq!(store.save(&sample(1)).unwrap().id, 1);
    assert_eq!(store.save(&sample(2)).unwrap().id, 1);

    let last = store.load_last().unwrap().unwrap();
    assert_eq!(last.config, sample(2));
}

#[test]
fn test_json_store_missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileConfigStore::new(dir.path().join("config.json"));
    assert!(store.load_last().unwrap().is_none());
    assert!(!store.path().exists());
}

#[test]
fn test_json_store_persists_across_instances() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");

    let saved = JsonFileConfigStore::new(&path).save(&sample(3)).unwrap();
    assert_eq!(saved.id, 1);

    let reopened = JsonFileConfigStore::new(&path);
    let last = reopened.load_last().unwrap().unwrap();
    assert_eq!(last, saved);

    let resaved = reopened.save(&sample(4)).unwrap();
    assert_eq!(resaved.id, 1);
    assert_eq!(reopened.load_last().unwrap().unwrap().config.num_vendors, 4);
}

#[test]
fn test_json_store_rejects_invalid_config() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileConfigStore::new(dir.path().join("config.json"));
    let bad = TicketingConfig {
        total_tickets: 50,
        max_ticket_capacity: 10,
        ..TicketingConfig::default()
    };
    assert!(matches!(store.save(&bad), Err(StoreError::Invalid(_))));
    assert!(store.load_last().unwrap().is_none());
}

#[test]
fn test_json_store_reports_corrupt_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    let store = JsonFileConfigStore::new(&path);
    assert!(matches!(store.load_last(), Err(StoreError::Serde(_))));
}
