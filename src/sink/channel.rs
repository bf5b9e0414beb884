use super::{EventSink, SinkError};
use crate::event::Event;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Create a bounded event channel. Pushing blocks while it is full.
pub fn create_channel(buffer_size: usize) -> (ChannelSink, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(buffer_size);
    (ChannelSink::new(tx), rx)
}

#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<Event>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<Event>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl EventSink for ChannelSink {
    async fn push(&self, event: Event) -> Result<(), SinkError> {
        self.tx.send(event).await.map_err(|_| SinkError::Closed)
    }
}
