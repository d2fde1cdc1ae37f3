//! Builders to construct ticket pools from configuration.

pub mod pool_builder;

pub use pool_builder::{build_pool, TicketPoolBuilder};
