//! Append-only log file sink.

use std::fs::{create_dir_all, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::core::{EventSink, TicketEvent};

/// Writes each event message as one line of a text file.
///
/// Write failures are logged and dropped; the pool never sees them.
pub struct FileSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileSink {
    /// Open (or create) `path` for appending, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Location of the log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole log back.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be read.
    pub fn contents(&self) -> io::Result<String> {
        std::fs::read_to_string(&self.path)
    }
}

impl EventSink for FileSink {
    fn emit(&self, event: &TicketEvent) {
        let mut file = self.file.lock();
        if let Err(e) = writeln!(file, "{event}").and_then(|()| file.flush()) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to write event log");
        }
    }
}

impl std::fmt::Debug for FileSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSink").field("path", &self.path).finish()
    }
}
