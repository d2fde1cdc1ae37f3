//! Pool events and the sink abstraction that receives them.
//!
//! The pool only emits events; where they end up (log file, live
//! subscribers, an in-memory backlog) is decided by the [`EventSink`]
//! attached at construction. Concrete storage-backed sinks live in
//! [`crate::infra::sink`].

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use super::Ticket;

/// Something that happened inside the pool, rendered for humans by `Display`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TicketEvent {
    /// A vendor is blocked because the add would exceed capacity.
    CapacityReached {
        /// Name of the blocked thread.
        actor: String,
        /// Tickets the vendor is trying to add.
        requested: usize,
        /// Pool capacity.
        capacity: usize,
    },
    /// Tickets were appended to the pool.
    TicketsAdded {
        /// Name of the adding thread.
        actor: String,
        /// Tickets created, in sequence order.
        tickets: Vec<Ticket>,
        /// Ticket count after the add.
        total: usize,
    },
    /// A customer is blocked because no tickets are available.
    NoTickets {
        /// Name of the blocked thread.
        actor: String,
    },
    /// Tickets were taken from the front of the pool.
    TicketsRemoved {
        /// Name of the removing thread.
        actor: String,
        /// Tickets removed, oldest first.
        tickets: Vec<Ticket>,
        /// Ticket count after the removal.
        total: usize,
    },
    /// Workers were spawned.
    Started {
        /// Identifier of this start/stop cycle.
        run_id: Uuid,
        /// Number of vendor workers.
        vendors: usize,
        /// Number of customer workers.
        customers: usize,
    },
    /// All workers were cancelled and joined.
    Stopped {
        /// Identifier of the finished cycle.
        run_id: Uuid,
        /// Number of workers that were stopped.
        workers: usize,
    },
}

impl TicketEvent {
    /// Short machine-friendly name of the event kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::CapacityReached { .. } => "capacity_reached",
            Self::TicketsAdded { .. } => "tickets_added",
            Self::NoTickets { .. } => "no_tickets",
            Self::TicketsRemoved { .. } => "tickets_removed",
            Self::Started { .. } => "started",
            Self::Stopped { .. } => "stopped",
        }
    }
}

fn describe(tickets: &[Ticket]) -> String {
    match tickets {
        [] => "no tickets".to_string(),
        [only] => only.to_string(),
        [first, .., last] => format!("{} tickets ({first} .. {last})", tickets.len()),
    }
}

impl fmt::Display for TicketEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityReached { actor, .. } => {
                write!(f, "{actor}: Max capacity reached. Waiting to add tickets...")
            }
            Self::TicketsAdded {
                actor,
                tickets,
                total,
            } => write!(
                f,
                "{actor} added {}. Total ticket count: {total}",
                describe(tickets)
            ),
            Self::NoTickets { actor } => write!(f, "{actor}: No tickets available. Waiting..."),
            Self::TicketsRemoved {
                actor,
                tickets,
                total,
            } => write!(
                f,
                "{actor} purchased {}. Remaining tickets: {total}",
                describe(tickets)
            ),
            Self::Started {
                vendors, customers, ..
            } => write!(
                f,
                "Ticketing system started with {vendors} vendors and {customers} customers."
            ),
            Self::Stopped { .. } => write!(f, "Ticketing system stopped."),
        }
    }
}

/// Receiver of pool events.
///
/// Implementations must tolerate concurrent calls from many workers and must
/// not call back into the emitting pool: pool events are delivered while the
/// pool lock is held so that their order matches ticket sequence order.
pub trait EventSink: Send + Sync {
    /// Deliver one event.
    fn emit(&self, event: &TicketEvent);
}

impl<F> EventSink for F
where
    F: Fn(&TicketEvent) + Send + Sync,
{
    fn emit(&self, event: &TicketEvent) {
        self(event);
    }
}

/// Default sink: structured `tracing` records.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &TicketEvent) {
        match event {
            TicketEvent::CapacityReached {
                actor,
                requested,
                capacity,
            } => tracing::debug!(actor = %actor, requested, capacity, "{event}"),
            TicketEvent::NoTickets { actor } => tracing::debug!(actor = %actor, "{event}"),
            TicketEvent::TicketsAdded { actor, total, .. }
            | TicketEvent::TicketsRemoved { actor, total, .. } => {
                tracing::info!(actor = %actor, total, kind = event.kind(), "{event}");
            }
            TicketEvent::Started { run_id, .. } | TicketEvent::Stopped { run_id, .. } => {
                tracing::info!(run_id = %run_id, kind = event.kind(), "{event}");
            }
        }
    }
}

/// Forwards every event to each of its sinks in order.
#[derive(Clone, Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl FanoutSink {
    /// Create an empty fan-out.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sink to the fan-out.
    #[must_use]
    pub fn with(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Number of downstream sinks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Whether no downstream sinks are attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl EventSink for FanoutSink {
    fn emit(&self, event: &TicketEvent) {
        for sink in &self.sinks {
            sink.emit(event);
        }
    }
}

impl fmt::Debug for FanoutSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FanoutSink")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}
