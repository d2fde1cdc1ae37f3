//! # Ticket Pool
//!
//! A bounded, thread-safe ticket pool shared by concurrent vendor (producer)
//! and customer (consumer) workers.
//!
//! Vendors append sequentially numbered tickets and block while the pool is
//! full; customers take tickets from the front and block while it is empty.
//! Every blocked call and every sleep between iterations is cancellable, so
//! `stop` returns promptly and the system can be started again.
//!
//! ## Key Features
//!
//! - **Bounded buffer**: one lock and one condition variable; waiters always
//!   re-check their predicate after waking
//! - **Gap-free numbering**: ticket sequence numbers are strictly increasing
//!   and never reused, even across stop/start cycles
//! - **Cooperative cancellation**: [`core::CancellationToken`] interrupts
//!   pool waits and worker sleeps without polling
//! - **Pluggable event sinks**: tracing, an in-memory backlog, an append-only
//!   log file, crossbeam channels, and tokio broadcast subscribers
//! - **Saved configurations**: in-memory or JSON file stores driving a
//!   [`runtime::TicketingService`]
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use ticket_pool::core::{CancellationToken, TicketPool};
//! use ticket_pool::infra::MemorySink;
//!
//! let sink = Arc::new(MemorySink::default());
//! let pool = TicketPool::with_sink(0, 10, sink.clone())?;
//!
//! pool.start(2, 1, Duration::from_millis(5), Duration::from_millis(10))?;
//! std::thread::sleep(Duration::from_millis(50));
//! pool.stop()?;
//!
//! assert!(pool.ticket_count() <= 10);
//! assert!(!sink.is_empty());
//!
//! // Direct use from the calling thread.
//! let token = CancellationToken::new();
//! let before = pool.ticket_count();
//! if before < 10 {
//!     pool.add_tickets(1, &token)?;
//!     assert_eq!(pool.ticket_count(), before + 1);
//! }
//! # Ok::<(), ticket_pool::core::PoolError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Ticket pool, workers, cancellation, and events.
pub mod core;
/// Configuration models for the ticketing system.
pub mod config;
/// Builders to construct pools from configuration.
pub mod builders;
/// Infrastructure adapters for event sinks and configuration storage.
pub mod infra;
/// Service layer that starts and stops pools from configurations.
pub mod runtime;
/// Shared utilities.
pub mod util;
