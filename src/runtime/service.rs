//! Ticketing service: owns the active pool and the configuration store.

use std::sync::Arc;

use anyhow::{bail, Context};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::builders::build_pool;
use crate::config::TicketingConfig;
use crate::core::{AppResult, EventSink, PoolError, TicketPool};
use crate::infra::{ConfigStore, SavedConfig};

/// Point-in-time view of the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemStatus {
    /// Whether workers are active.
    pub running: bool,
    /// Tickets in the current pool, 0 when there is none.
    pub ticket_count: usize,
    /// Capacity of the current pool.
    pub capacity: Option<usize>,
    /// Identifier of the active start/stop cycle.
    pub run_id: Option<Uuid>,
}

/// Builds a fresh pool per `start`, and persists configurations.
pub struct TicketingService<S> {
    store: S,
    sink: Arc<dyn EventSink>,
    pool: Mutex<Option<Arc<TicketPool>>>,
}

impl<S: ConfigStore> TicketingService<S> {
    /// Create a service whose pools report to `sink`.
    pub fn new(store: S, sink: Arc<dyn EventSink>) -> Self {
        Self {
            store,
            sink,
            pool: Mutex::new(None),
        }
    }

    /// Build a new pool from `config` and start its workers.
    ///
    /// Returns a human-readable confirmation.
    ///
    /// # Errors
    ///
    /// Fails if a pool is already running, the configuration is invalid, or
    /// a worker thread cannot be spawned.
    pub fn start(&self, config: &TicketingConfig) -> AppResult<String> {
        let mut current = self.pool.lock();
        if current.as_ref().is_some_and(|pool| pool.is_running()) {
            bail!(PoolError::AlreadyRunning);
        }

        let pool = build_pool(config, Arc::clone(&self.sink))
            .context("failed to build ticket pool")?;
        pool.start(
            config.num_vendors,
            config.num_customers,
            config.release_interval(),
            config.retrieval_interval(),
        )
        .context("failed to start ticketing system")?;

        *current = Some(Arc::new(pool));
        Ok(format!(
            "Ticketing system started with {} vendors and {} customers.",
            config.num_vendors, config.num_customers
        ))
    }

    /// Stop the running pool. Does nothing when nothing runs.
    ///
    /// # Errors
    ///
    /// Fails if some worker did not exit within the grace period.
    pub fn stop(&self) -> AppResult<()> {
        let current = self.pool.lock();
        match current.as_ref() {
            Some(pool) => match pool.stop() {
                Ok(()) | Err(PoolError::NotRunning) => Ok(()),
                Err(e) => Err(e).context("failed to stop ticketing system"),
            },
            None => Ok(()),
        }
    }

    /// Tickets in the current pool, 0 when no pool exists.
    #[must_use]
    pub fn ticket_count(&self) -> usize {
        self.pool.lock().as_ref().map_or(0, |pool| pool.ticket_count())
    }

    /// Snapshot of the current pool.
    #[must_use]
    pub fn status(&self) -> SystemStatus {
        let current = self.pool.lock();
        current.as_ref().map_or(
            SystemStatus {
                running: false,
                ticket_count: 0,
                capacity: None,
                run_id: None,
            },
            |pool| SystemStatus {
                running: pool.is_running(),
                ticket_count: pool.ticket_count(),
                capacity: Some(pool.capacity()),
                run_id: pool.run_id(),
            },
        )
    }

    /// The current pool, if one has been started.
    #[must_use]
    pub fn pool(&self) -> Option<Arc<TicketPool>> {
        self.pool.lock().clone()
    }

    /// Persist `config` as the saved configuration.
    ///
    /// # Errors
    ///
    /// Fails on invalid configuration or store errors.
    pub fn save_config(&self, config: &TicketingConfig) -> AppResult<SavedConfig> {
        let saved = self.store.save(config).context("failed to save configuration")?;
        info!(id = saved.id, "configuration saved");
        Ok(saved)
    }

    /// The last saved configuration, if any.
    ///
    /// # Errors
    ///
    /// Fails if the store cannot be read.
    pub fn load_config(&self) -> AppResult<Option<TicketingConfig>> {
        let saved = self
            .store
            .load_last()
            .context("failed to load configuration")?;
        Ok(saved.map(|record| record.config))
    }

    /// Start from the last saved configuration.
    ///
    /// # Errors
    ///
    /// Fails if nothing is saved, or as [`TicketingService::start`].
    pub fn start_saved(&self) -> AppResult<String> {
        let Some(config) = self.load_config()? else {
            bail!("no saved configuration");
        };
        self.start(&config)
    }

    /// The configuration store.
    pub const fn store(&self) -> &S {
        &self.store
    }
}

impl<S> std::fmt::Debug for TicketingService<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TicketingService")
            .field("pool", &*self.pool.lock())
            .finish_non_exhaustive()
    }
}
