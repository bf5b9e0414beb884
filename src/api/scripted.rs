use super::types::{FetchRequest, LogRecord, RecordPage, SourcePage};
use super::{ApiError, LogApi, Result};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// In-process `LogApi` for unit tests: responses are queued per call.
#[derive(Default)]
pub struct ScriptedApi {
    pub source_pages: Mutex<HashMap<String, VecDeque<Result<SourcePage>>>>,
    pub tag_responses: Mutex<HashMap<String, VecDeque<Result<HashMap<String, String>>>>>,
    pub record_pages: Mutex<HashMap<String, VecDeque<Result<RecordPage>>>>,
    pub list_calls: Mutex<Vec<(String, Option<String>)>>,
    pub tag_calls: Mutex<Vec<String>>,
    pub fetch_calls: Mutex<Vec<FetchRequest>>,
}

impl ScriptedApi {
    pub fn push_sources(&self, prefix: &str, sources: &[&str], next_token: Option<&str>) {
        self.source_pages
            .lock()
            .unwrap()
            .entry(prefix.to_string())
            .or_default()
            .push_back(Ok(SourcePage {
                sources: sources.iter().map(|s| s.to_string()).collect(),
                next_token: next_token.map(str::to_string),
            }));
    }

    pub fn push_tags(&self, source: &str, tags: Result<HashMap<String, String>>) {
        self.tag_responses
            .lock()
            .unwrap()
            .entry(source.to_string())
            .or_default()
            .push_back(tags);
    }

    pub fn push_records(&self, source: &str, page: Result<RecordPage>) {
        self.record_pages
            .lock()
            .unwrap()
            .entry(source.to_string())
            .or_default()
            .push_back(page);
    }

    pub fn tag_call_count(&self) -> usize {
        self.tag_calls.lock().unwrap().len()
    }
}

pub fn record(timestamp: i64, message: &str) -> LogRecord {
    LogRecord {
        message: message.to_string(),
        timestamp,
        ingestion_time: timestamp + 5,
        stream_name: "stream-1".to_string(),
        event_id: format!("evt-{}", timestamp),
    }
}

#[async_trait]
impl LogApi for ScriptedApi {
    async fn list_sources(&self, prefix: &str, next_token: Option<&str>) -> Result<SourcePage> {
        self.list_calls
            .lock()
            .unwrap()
            .push((prefix.to_string(), next_token.map(str::to_string)));
        self.source_pages
            .lock()
            .unwrap()
            .get_mut(prefix)
            .and_then(|q| q.pop_front())
            .unwrap_or_else(|| Ok(SourcePage::default()))
    }

    async fn list_tags(&self, source: &str) -> Result<HashMap<String, String>> {
        self.tag_calls.lock().unwrap().push(source.to_string());
        self.tag_responses
            .lock()
            .unwrap()
            .get_mut(source)
            .and_then(|q| q.pop_front())
            .unwrap_or_else(|| Ok(HashMap::new()))
    }

    async fn fetch_records(&self, request: &FetchRequest) -> Result<RecordPage> {
        self.fetch_calls.lock().unwrap().push(request.clone());
        self.record_pages
            .lock()
            .unwrap()
            .get_mut(&request.source)
            .and_then(|q| q.pop_front())
            .unwrap_or_else(|| Ok(RecordPage::default()))
    }
}

pub fn service_error(code: &str) -> ApiError {
    ApiError::Service {
        code: code.to_string(),
        message: "scripted failure".to_string(),
    }
}
