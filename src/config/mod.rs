//! Configuration models for the ticketing system.

pub mod ticketing;

pub use ticketing::TicketingConfig;
