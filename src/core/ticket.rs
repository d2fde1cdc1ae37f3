//! Ticket identity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A unit of inventory held by the pool.
///
/// Tickets are fungible; the sequence number only exists so log lines can
/// say which ticket moved (`Ticket: 7`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticket {
    sequence: u64,
}

impl Ticket {
    /// Create a ticket with the given sequence number.
    #[must_use]
    pub const fn new(sequence: u64) -> Self {
        Self { sequence }
    }

    /// Sequence number assigned when the ticket was created.
    #[must_use]
    pub const fn sequence(self) -> u64 {
        self.sequence
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ticket: {}", self.sequence)
    }
}
