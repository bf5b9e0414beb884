pub mod channel;
pub mod writer;

pub use channel::{create_channel, ChannelSink};
pub use writer::run_writer;

use crate::event::Event;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("output queue closed")]
    Closed,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Downstream queue accepting one event at a time, in push order.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn push(&self, event: Event) -> Result<(), SinkError>;
}
