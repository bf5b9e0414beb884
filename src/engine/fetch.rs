use super::{now_ms, EngineError};
use crate::api::{continuation, FetchRequest, LogApi};
use crate::event::{EventBuilder, SourceContext};
use crate::metadata::TagCache;
use crate::position::{PositionStore, StartPosition};
use crate::sink::EventSink;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Every page currently available was consumed.
    Drained { pages: usize, events: usize },
    /// Shutdown was requested between pages.
    Interrupted { events: usize },
}

/// Borrowed engine state needed to drain one source.
pub struct SourceFetcher<'a> {
    pub api: &'a dyn LogApi,
    pub sink: &'a dyn EventSink,
    pub builder: &'a EventBuilder,
    pub positions: &'a mut PositionStore,
    pub tags: &'a mut TagCache,
    pub start_position: StartPosition,
}

impl SourceFetcher<'_> {
    /// Fetch pages for `source` from its stored cursor until the API has no
    /// more pages, persisting positions after every page.
    ///
    /// Every page of one drain is requested with the cursor held before the
    /// first page. The remote start time is inclusive, so only records older
    /// than that cursor are dropped. Records sharing a millisecond across a
    /// page boundary are all emitted.
    pub async fn drain(
        &mut self,
        source: &str,
        shutdown: &CancellationToken,
    ) -> Result<FetchOutcome, EngineError> {
        let ctx = SourceContext::new(source);
        let mut next_token: Option<String> = None;
        let mut pages = 0usize;
        let mut events = 0usize;
        let start_time = self.cursor_for(source);

        loop {
            let request = FetchRequest {
                source: source.to_string(),
                start_time,
                next_token: next_token.take(),
                interleaved: true,
            };

            let page = self.api.fetch_records(&request).await?;
            pages += 1;
            debug!(
                source = %source,
                start_time,
                records = page.records.len(),
                "Fetched page"
            );

            if !page.records.is_empty() {
                let tags = self.tags.get(self.api, source).await?;

                for record in &page.records {
                    if record.timestamp < start_time {
                        trace!(
                            source = %source,
                            timestamp = record.timestamp,
                            cursor = start_time,
                            "Dropping record older than cursor"
                        );
                        continue;
                    }

                    events += self.builder.emit(record, &ctx, &tags, self.sink).await?;
                    self.positions
                        .advance(source, record.timestamp.saturating_add(1));
                }
            }

            self.positions.flush();

            next_token = continuation(page.next_token);
            if next_token.is_none() {
                break;
            }

            if shutdown.is_cancelled() {
                debug!(source = %source, "Shutdown requested between pages");
                return Ok(FetchOutcome::Interrupted { events });
            }
        }

        Ok(FetchOutcome::Drained { pages, events })
    }

    /// Stored cursor, or the start-position policy for a source seen for
    /// the first time mid-run.
    fn cursor_for(&mut self, source: &str) -> i64 {
        if let Some(cursor) = self.positions.get(source) {
            return cursor;
        }
        let cursor = self.start_position.initial_cursor(now_ms());
        debug!(source = %source, cursor, "New source, assigned start position");
        self.positions.insert(source, cursor);
        cursor
    }
}
