//! Error types for ticket pool operations.

use std::time::Duration;

use thiserror::Error;

/// Errors produced by the ticket pool and its workers.
#[derive(Debug, Error)]
pub enum PoolError {
    /// Capacity or initial count rejected at construction.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// A single request asks for more tickets than the pool can ever hold.
    #[error("requested {requested} tickets but capacity is {capacity}")]
    ExceedsCapacity {
        /// Tickets requested by the caller.
        requested: usize,
        /// Fixed pool capacity.
        capacity: usize,
    },
    /// `start` was called while workers are already running.
    #[error("ticketing system is already running")]
    AlreadyRunning,
    /// `stop` was called while no workers are running.
    #[error("ticketing system is not running")]
    NotRunning,
    /// A blocked add/remove was aborted by cancellation.
    #[error("operation cancelled")]
    Cancelled,
    /// Workers did not acknowledge cancellation within the stop grace period.
    #[error("{} worker(s) failed to stop within {grace:?}: {}", workers.len(), workers.join(", "))]
    WorkerLeak {
        /// Names of the workers that never acknowledged.
        workers: Vec<String>,
        /// Grace period that elapsed.
        grace: Duration,
    },
    /// The OS refused to spawn a worker thread.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

impl PoolError {
    /// Returns true for the normal termination signal of a blocked call.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Errors produced by configuration stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying file I/O failed.
    #[error("store i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// Stored document could not be encoded or decoded.
    #[error("store serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Configuration was rejected before saving.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
