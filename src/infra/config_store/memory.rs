//! In-memory configuration store.

use parking_lot::Mutex;

use super::{next_record, ConfigStore, SavedConfig};
use crate::config::TicketingConfig;
use crate::core::StoreError;

/// Keeps the saved configuration for the lifetime of the process.
#[derive(Debug, Default)]
pub struct InMemoryConfigStore {
    record: Mutex<Option<SavedConfig>>,
}

impl InMemoryConfigStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn save(&self, config: &TicketingConfig) -> Result<SavedConfig, StoreError> {
        let mut record = self.record.lock();
        let saved = next_record(record.as_ref(), config)?;
        *record = Some(saved.clone());
        Ok(saved)
    }

    fn load_last(&self) -> Result<Option<SavedConfig>, StoreError> {
        Ok(self.record.lock().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store_loads_nothing() {
        assert!(InMemoryConfigStore::new().load_last().unwrap().is_none());
    }

    #[test]
    fn test_resave_keeps_id() {
        let store = InMemoryConfigStore::new();
        let first = store.save(&TicketingConfig::default()).unwrap();
        assert_eq!(first.id, 1);

        let updated = TicketingConfig {
            num_vendors: 4,
            ..TicketingConfig::default()
        };
        let second = store.save(&updated).unwrap();
        assert_eq!(second.id, 1);
        assert_eq!(store.load_last().unwrap().unwrap().config.num_vendors, 4);
    }

    #[test]
    fn test_invalid_config_is_not_saved() {
        let store = InMemoryConfigStore::new();
        let bad = TicketingConfig {
            max_ticket_capacity: 0,
            ..TicketingConfig::default()
        };
        assert!(matches!(store.save(&bad), Err(StoreError::Invalid(_))));
        assert!(store.load_last().unwrap().is_none());
    }
}
