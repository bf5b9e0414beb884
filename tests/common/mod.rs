#![allow(dead_code)]

use async_trait::async_trait;
use cwingest::api::{ApiError, FetchRequest, LogApi, LogRecord, RecordPage, SourcePage};
use cwingest::engine::{Engine, EngineSettings};
use cwingest::event::{Decorator, Event, EventBuilder, PlainCodec};
use cwingest::position::{PositionStore, StartPosition};
use cwingest::config::SourceErrorPolicy;
use cwingest::sink::create_channel;
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

type Queue<T> = Mutex<HashMap<String, VecDeque<Result<T, ApiError>>>>;

/// Log API that replays queued responses and records every call.
#[derive(Default)]
pub struct FakeLogApi {
    sources: Queue<SourcePage>,
    records: Queue<RecordPage>,
    pub fetches: Mutex<Vec<FetchRequest>>,
    pub tag_calls: Mutex<usize>,
}

impl FakeLogApi {
    pub fn sources_page(&self, prefix: &str, names: &[&str], next: Option<&str>) {
        self.sources
            .lock()
            .unwrap()
            .entry(prefix.to_string())
            .or_default()
            .push_back(Ok(SourcePage {
                sources: names.iter().map(|s| s.to_string()).collect(),
                next_token: next.map(str::to_string),
            }));
    }

    pub fn records_page(&self, source: &str, timestamps: &[i64], next: Option<&str>) {
        self.records
            .lock()
            .unwrap()
            .entry(source.to_string())
            .or_default()
            .push_back(Ok(RecordPage {
                records: timestamps.iter().map(|ts| record(*ts)).collect(),
                next_token: next.map(str::to_string),
            }));
    }

    pub fn throttle(&self, source: &str) {
        self.records
            .lock()
            .unwrap()
            .entry(source.to_string())
            .or_default()
            .push_back(Err(ApiError::Throttled("Rate exceeded".to_string())));
    }

    pub fn fetched_sources(&self) -> Vec<String> {
        self.fetches
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.source.clone())
            .collect()
    }
}

pub fn record(timestamp: i64) -> LogRecord {
    LogRecord {
        message: format!("record at {}", timestamp),
        timestamp,
        ingestion_time: timestamp + 1,
        stream_name: "stream".to_string(),
        event_id: format!("id-{}", timestamp),
    }
}

#[async_trait]
impl LogApi for FakeLogApi {
    async fn list_sources(&self, prefix: &str, _next_token: Option<&str>) -> Result<SourcePage, ApiError> {
        self.sources
            .lock()
            .unwrap()
            .get_mut(prefix)
            .and_then(|q| q.pop_front())
            .unwrap_or_else(|| Ok(SourcePage::default()))
    }

    async fn list_tags(&self, _source: &str) -> Result<HashMap<String, String>, ApiError> {
        *self.tag_calls.lock().unwrap() += 1;
        Ok(HashMap::from([("Cost Center".to_string(), "42".to_string())]))
    }

    async fn fetch_records(&self, request: &FetchRequest) -> Result<RecordPage, ApiError> {
        self.fetches.lock().unwrap().push(request.clone());
        self.records
            .lock()
            .unwrap()
            .get_mut(&request.source)
            .and_then(|q| q.pop_front())
            .unwrap_or_else(|| Ok(RecordPage::default()))
    }
}

pub fn settings(groups: &[&str], prefix: bool, start: StartPosition) -> EngineSettings {
    EngineSettings {
        log_groups: groups.iter().map(|s| s.to_string()).collect(),
        log_group_prefix: prefix,
        start_position: start,
        interval: Duration::from_millis(20),
        on_source_error: SourceErrorPolicy::Skip,
    }
}

pub fn build_engine(
    api: Arc<FakeLogApi>,
    sincedb: &Path,
    settings: EngineSettings,
) -> (Engine, mpsc::Receiver<Event>) {
    let (sink, rx) = create_channel(256);
    let engine = Engine::new(
        api,
        Arc::new(sink),
        EventBuilder::new(Arc::new(PlainCodec), Decorator::default()),
        settings,
        PositionStore::load(sincedb),
    );
    (engine, rx)
}

pub fn drain_timestamps(rx: &mut mpsc::Receiver<Event>) -> Vec<i64> {
    let mut out = Vec::new();
    while let Ok(event) = rx.try_recv() {
        out.push(event.timestamp.timestamp_millis());
    }
    out
}
