//! JSON file configuration store.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::debug;

use super::{next_record, ConfigStore, SavedConfig};
use crate::config::TicketingConfig;
use crate::core::StoreError;

/// Stores the saved configuration as a pretty-printed JSON document.
///
/// Writes go to a sibling temporary file that is then renamed over the
/// target, so a crash never leaves a half-written record.
#[derive(Debug)]
pub struct JsonFileConfigStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl JsonFileConfigStore {
    /// Use `path` as the backing document. Nothing is touched until the
    /// first save.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    /// Location of the backing document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Option<SavedConfig>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, record: &SavedConfig) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, serde_json::to_vec_pretty(record)?)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), id = record.id, "configuration saved");
        Ok(())
    }
}

impl ConfigStore for JsonFileConfigStore {
    fn save(&self, config: &TicketingConfig) -> Result<SavedConfig, StoreError> {
        let _guard = self.write_lock.lock();
        let previous = self.read()?;
        let saved = next_record(previous.as_ref(), config)?;
        self.write(&saved)?;
        Ok(saved)
    }

    fn load_last(&self) -> Result<Option<SavedConfig>, StoreError> {
        self.read()
    }
}
