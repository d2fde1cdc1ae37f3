//! Event sink backends.

#[cfg(feature = "tokio-runtime")]
pub mod broadcast;
pub mod channel;
pub mod file;
pub mod memory;

#[cfg(feature = "tokio-runtime")]
pub use broadcast::BroadcastSink;
pub use channel::ChannelSink;
pub use file::FileSink;
pub use memory::{MemorySink, RecordedEvent};
