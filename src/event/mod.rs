pub mod builder;
pub mod codec;
pub mod decorate;

pub use builder::{EventBuilder, SourceContext};
pub use codec::{codec_for, Codec, JsonCodec, JsonLinesCodec, PlainCodec};
pub use decorate::Decorator;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

/// One decoded unit of a record.
pub type Fields = Map<String, Value>;

/// Normalized event handed to the sink.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub timestamp: DateTime<Utc>,
    pub fields: Fields,
}

impl Event {
    pub fn new(timestamp: DateTime<Utc>, fields: Fields) -> Self {
        Self { timestamp, fields }
    }

    /// Render as a JSON object with an `@timestamp` field.
    pub fn to_json(&self) -> Value {
        let mut out = Map::with_capacity(self.fields.len() + 1);
        out.insert("@timestamp".to_string(), Value::String(format_time(&self.timestamp)));
        for (key, value) in &self.fields {
            out.insert(key.clone(), value.clone());
        }
        Value::Object(out)
    }
}

/// Convert epoch milliseconds to a timestamp: whole seconds plus the
/// remaining milliseconds as microseconds.
pub fn parse_time(ms: i64) -> DateTime<Utc> {
    let secs = ms.div_euclid(1000);
    let micros = ms.rem_euclid(1000) * 1000;
    DateTime::from_timestamp(secs, (micros * 1000) as u32).unwrap_or_default()
}

pub fn format_time(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}
