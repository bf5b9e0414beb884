pub mod fetch;
pub mod runner;

pub use fetch::FetchOutcome;
pub use runner::{Engine, EngineSettings, EngineState, PassOutcome};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("api error: {0}")]
    Api(#[from] crate::api::ApiError),

    #[error("sink error: {0}")]
    Sink(#[from] crate::sink::SinkError),

    #[error("discovery failed during startup: {0}")]
    Startup(#[source] crate::api::ApiError),

    #[error("source '{source_id}' failed: {error}")]
    Source {
        source_id: String,
        #[source]
        error: crate::api::ApiError,
    },
}

impl EngineError {
    pub fn is_throttled(&self) -> bool {
        matches!(self, EngineError::Api(e) if e.is_throttled())
    }
}

/// Wall clock in epoch milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
