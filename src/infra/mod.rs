//! Infrastructure adapters for event sinks and configuration storage.

pub mod config_store;
pub mod sink;

pub use config_store::{ConfigStore, InMemoryConfigStore, JsonFileConfigStore, SavedConfig};
#[cfg(feature = "tokio-runtime")]
pub use sink::BroadcastSink;
pub use sink::{ChannelSink, FileSink, MemorySink};
