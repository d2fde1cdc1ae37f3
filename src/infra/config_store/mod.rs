//! Configuration store backends.
//!
//! A store keeps at most one saved [`TicketingConfig`]: saving again updates
//! that record in place and keeps its id.

pub mod json_file;
pub mod memory;

use serde::{Deserialize, Serialize};

use crate::config::TicketingConfig;
use crate::core::StoreError;

pub use json_file::JsonFileConfigStore;
pub use memory::InMemoryConfigStore;

/// A persisted configuration record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedConfig {
    /// Record id, assigned on first save.
    pub id: u64,
    /// The saved configuration.
    pub config: TicketingConfig,
    /// Timestamp milliseconds of the latest save.
    pub saved_at_ms: u128,
}

/// Persistence for the most recently saved configuration.
pub trait ConfigStore: Send + Sync {
    /// Validate and save `config`, replacing the previous record's contents.
    ///
    /// # Errors
    ///
    /// [`StoreError::Invalid`] if validation fails, or a backend error.
    fn save(&self, config: &TicketingConfig) -> Result<SavedConfig, StoreError>;

    /// The most recently saved record, if any.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the record cannot be read.
    fn load_last(&self) -> Result<Option<SavedConfig>, StoreError>;
}

/// Shared save rule: keep the previous id, or start at 1.
pub(crate) fn next_record(
    previous: Option<&SavedConfig>,
    config: &TicketingConfig,
) -> Result<SavedConfig, StoreError> {
    config.validate().map_err(StoreError::Invalid)?;
    Ok(SavedConfig {
        id: previous.map_or(1, |p| p.id),
        config: config.clone(),
        saved_at_ms: crate::util::clock::now_ms(),
    })
}
