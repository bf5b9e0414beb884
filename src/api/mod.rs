pub mod http;
pub mod types;

#[cfg(test)]
pub(crate) mod scripted;

pub use http::HttpLogApi;
pub use types::{FetchRequest, LogRecord, RecordPage, SourcePage};

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("rate limited: {0}")]
    Throttled(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service error {code}: {message}")]
    Service { code: String, message: String },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn is_throttled(&self) -> bool {
        matches!(self, ApiError::Throttled(_))
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Remote log-query API consumed by the engine.
///
/// All three calls paginate (or may be throttled) independently; callers
/// follow `next_token` until it is `None`.
#[async_trait]
pub trait LogApi: Send + Sync {
    /// List source names starting with `prefix`.
    async fn list_sources(&self, prefix: &str, next_token: Option<&str>) -> Result<SourcePage>;

    /// List the descriptive tags attached to a source.
    async fn list_tags(&self, source: &str) -> Result<HashMap<String, String>>;

    /// Fetch records for a source with `timestamp >= start_time`.
    async fn fetch_records(&self, request: &FetchRequest) -> Result<RecordPage>;
}

/// Treats an empty continuation token the same as an absent one.
pub fn continuation(token: Option<String>) -> Option<String> {
    token.filter(|t| !t.is_empty())
}
