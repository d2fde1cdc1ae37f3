//! Orchestration of ticket pools over a configuration store.

pub mod service;

pub use service::{SystemStatus, TicketingService};
