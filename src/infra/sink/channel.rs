//! One-way channel sink.

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::core::{EventSink, TicketEvent};

/// Sends each rendered event message down a crossbeam channel.
///
/// Messages are dropped silently once every receiver is gone.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: Sender<String>,
}

impl ChannelSink {
    /// Wrap an existing sender.
    #[must_use]
    pub const fn new(tx: Sender<String>) -> Self {
        Self { tx }
    }

    /// Create a sink and the receiving end of its unbounded channel.
    #[must_use]
    pub fn unbounded() -> (Self, Receiver<String>) {
        let (tx, rx) = unbounded();
        (Self::new(tx), rx)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: &TicketEvent) {
        let _ = self.tx.send(event.to_string());
    }
}
