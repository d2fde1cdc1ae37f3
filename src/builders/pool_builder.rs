//! Builders to construct ticket pools from configuration.

use std::sync::Arc;
use std::time::Duration;

use crate::config::TicketingConfig;
use crate::core::{EventSink, PoolError, PoolLimits, RemovalPolicy, TicketPool, TracingSink};

/// Fluent construction of a [`TicketPool`].
///
/// ```
/// use std::time::Duration;
/// use ticket_pool::builders::TicketPoolBuilder;
/// use ticket_pool::core::RemovalPolicy;
///
/// let pool = TicketPoolBuilder::new(50)
///     .initial_count(10)
///     .removal_policy(RemovalPolicy::WaitForFull)
///     .stop_grace(Duration::from_secs(1))
///     .build()?;
/// assert_eq!(pool.ticket_count(), 10);
/// # Ok::<(), ticket_pool::core::PoolError>(())
/// ```
pub struct TicketPoolBuilder {
    limits: PoolLimits,
    sink: Arc<dyn EventSink>,
}

impl TicketPoolBuilder {
    /// Start a builder for an empty pool of the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            limits: PoolLimits::new(0, capacity),
            sink: Arc::new(TracingSink),
        }
    }

    /// Tickets present at construction.
    #[must_use]
    pub const fn initial_count(mut self, count: usize) -> Self {
        self.limits.initial_count = count;
        self
    }

    /// Policy for removal requests larger than the stock.
    #[must_use]
    pub const fn removal_policy(mut self, policy: RemovalPolicy) -> Self {
        self.limits.removal_policy = policy;
        self
    }

    /// How long `stop` waits for workers.
    #[must_use]
    pub const fn stop_grace(mut self, grace: Duration) -> Self {
        self.limits.stop_grace = grace;
        self
    }

    /// Where the pool reports events.
    #[must_use]
    pub fn sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Validate and build the pool.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfiguration`] for invalid limits.
    pub fn build(self) -> Result<TicketPool, PoolError> {
        TicketPool::from_limits(self.limits, self.sink)
    }
}

/// Build a pool from a validated [`TicketingConfig`].
///
/// # Errors
///
/// Returns [`PoolError::InvalidConfiguration`] if the configuration fails
/// validation.
pub fn build_pool(cfg: &TicketingConfig, sink: Arc<dyn EventSink>) -> Result<TicketPool, PoolError> {
    cfg.validate().map_err(PoolError::InvalidConfiguration)?;
    TicketPool::from_limits(cfg.limits(), sink)
}
