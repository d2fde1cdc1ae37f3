//! In-memory event backlog.

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::core::{EventSink, TicketEvent};
use crate::util::clock::now_ms;

/// Default number of events kept by [`MemorySink::default`].
pub const DEFAULT_BACKLOG: usize = 100;

/// An event with the time it was received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    /// The event itself.
    pub event: TicketEvent,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
}

/// Bounded ring of the most recent events, oldest dropped first.
pub struct MemorySink {
    events: Mutex<VecDeque<RecordedEvent>>,
    max_events: usize,
}

impl MemorySink {
    /// Create a sink keeping at most `max_events` events.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Mutex::new(VecDeque::with_capacity(max_events.min(1024))),
            max_events,
        }
    }

    /// Snapshot of the stored events, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().iter().cloned().collect()
    }

    /// Rendered messages, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .map(|r| r.event.to_string())
            .collect()
    }

    /// All messages joined by newlines.
    #[must_use]
    pub fn transcript(&self) -> String {
        self.messages().join("\n")
    }

    /// Number of stored events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Drop every stored event.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new(DEFAULT_BACKLOG)
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: &TicketEvent) {
        if self.max_events == 0 {
            return;
        }
        let mut events = self.events.lock();
        if events.len() >= self.max_events {
            events.pop_front();
        }
        events.push_back(RecordedEvent {
            event: event.clone(),
            created_at_ms: now_ms(),
        });
    }
}

impl std::fmt::Debug for MemorySink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySink")
            .field("len", &self.len())
            .field("max_events", &self.max_events)
            .finish()
    }
}
