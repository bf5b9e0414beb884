use serde::{Deserialize, Serialize};

/// One record returned by a fetch. Timestamps are epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub message: String,
    pub timestamp: i64,
    #[serde(rename = "ingestionTime")]
    pub ingestion_time: i64,
    #[serde(rename = "logStreamName", default)]
    pub stream_name: String,
    #[serde(default)]
    pub event_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub source: String,
    pub start_time: i64,
    pub next_token: Option<String>,
    pub interleaved: bool,
}

#[derive(Debug, Clone, Default)]
pub struct RecordPage {
    pub records: Vec<LogRecord>,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SourcePage {
    pub sources: Vec<String>,
    pub next_token: Option<String>,
}
