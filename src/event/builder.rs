use super::{format_time, parse_time, Codec, Decorator, Event};
use crate::api::LogRecord;
use crate::metadata::Tags;
use crate::sink::{EventSink, SinkError};
use crate::source::SourceType;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::trace;

/// Field that holds the source metadata on every event.
pub const METADATA_FIELD: &str = "cloudwatch_logs";

/// Per-source context attached to every event built from that source.
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub source: String,
    pub source_type: SourceType,
}

impl SourceContext {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let source_type = SourceType::classify(&source);
        Self {
            source,
            source_type,
        }
    }
}

/// Turns raw records into normalized events and pushes them downstream.
pub struct EventBuilder {
    codec: Arc<dyn Codec>,
    decorator: Decorator,
}

impl EventBuilder {
    pub fn new(codec: Arc<dyn Codec>, decorator: Decorator) -> Self {
        Self { codec, decorator }
    }

    /// Decode `record` and push one event per decoded unit, in order.
    /// Returns how many events were pushed.
    pub async fn emit(
        &self,
        record: &LogRecord,
        ctx: &SourceContext,
        tags: &Tags,
        sink: &dyn EventSink,
    ) -> Result<usize, SinkError> {
        trace!(source = %ctx.source, event_id = %record.event_id, "Processing record");

        let metadata = build_metadata(record, ctx, tags);
        let events: Vec<Event> = self
            .codec
            .decode(record.message.as_bytes())
            .map(|fields| {
                let mut event = Event::new(parse_time(record.timestamp), fields);
                event
                    .fields
                    .insert(METADATA_FIELD.to_string(), metadata.clone());
                self.decorator.decorate(&mut event);
                event
            })
            .collect();

        let count = events.len();
        for event in events {
            sink.push(event).await?;
        }
        Ok(count)
    }
}

fn build_metadata(record: &LogRecord, ctx: &SourceContext, tags: &Tags) -> Value {
    let tags: Map<String, Value> = tags
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();

    let mut meta = Map::new();
    meta.insert(
        "ingestion_time".to_string(),
        Value::String(format_time(&parse_time(record.ingestion_time))),
    );
    meta.insert("log_group".to_string(), Value::String(ctx.source.clone()));
    meta.insert(
        "log_stream".to_string(),
        Value::String(record.stream_name.clone()),
    );
    meta.insert("event_id".to_string(), Value::String(record.event_id.clone()));
    meta.insert("tags".to_string(), Value::Object(tags));
    meta.insert(
        "log_type".to_string(),
        Value::String(ctx.source_type.as_str().to_string()),
    );
    Value::Object(meta)
}
