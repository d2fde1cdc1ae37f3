//! Ticket pool, workers, cancellation, and event reporting.

pub mod cancel;
pub mod error;
pub mod events;
pub mod ticket;
pub mod ticket_pool;
pub mod worker;

pub use cancel::CancellationToken;
pub use error::{AppResult, PoolError, StoreError};
pub use events::{EventSink, FanoutSink, TicketEvent, TracingSink};
pub use ticket::Ticket;
pub use ticket_pool::{PoolLimits, RemovalPolicy, TicketPool, DEFAULT_STOP_GRACE};
pub use worker::{Customer, Vendor, WorkerHandle, WorkerRole};
