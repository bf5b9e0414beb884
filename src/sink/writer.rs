use super::SinkError;
use crate::event::Event;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Drain the event channel, writing one JSON document per line.
///
/// Events already queued are written as one batch before the output is
/// flushed. Returns the number of events written once every sender is
/// dropped.
pub async fn run_writer<W: AsyncWrite + Unpin>(
    mut input: mpsc::Receiver<Event>,
    mut out: W,
) -> Result<u64, SinkError> {
    info!("Event writer started");
    let mut written = 0u64;
    let mut line = Vec::new();

    while let Some(first) = input.recv().await {
        let mut next = Some(first);
        while let Some(event) = next {
            line.clear();
            serde_json::to_writer(&mut line, &event.to_json())?;
            line.push(b'\n');
            out.write_all(&line).await?;
            written += 1;
            next = input.try_recv().ok();
        }
        out.flush().await?;
        debug!(count = written, "Flushed events");
    }

    out.shutdown().await?;
    info!(count = written, "Event writer finished");
    Ok(written)
}
