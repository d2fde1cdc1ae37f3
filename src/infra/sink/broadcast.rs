//! Live fan-out of event messages to async subscribers.

use tokio::sync::broadcast;

use crate::core::{EventSink, TicketEvent};

/// Broadcasts each rendered event message to every current subscriber.
///
/// Subscribers that fall behind by more than the channel capacity observe
/// `RecvError::Lagged` and skip ahead; the pool never blocks on them.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    sender: broadcast::Sender<String>,
}

impl BroadcastSink {
    /// Create a broadcaster with the given per-subscriber backlog.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to messages emitted from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl EventSink for BroadcastSink {
    fn emit(&self, event: &TicketEvent) {
        // No subscribers is not an error.
        let _ = self.sender.send(event.to_string());
    }
}
