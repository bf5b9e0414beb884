use crate::position::StartPosition;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub input: InputConfig,
    pub api: ApiConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Log group names, or prefixes when `log_group_prefix` is set.
    pub log_group: Vec<String>,
    #[serde(default)]
    pub log_group_prefix: bool,
    #[serde(default)]
    pub start_position: StartPosition,
    /// Seconds to wait between polling passes.
    #[serde(default = "default_interval")]
    pub interval: u64,
    pub sincedb_path: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub codec: CodecKind,
    #[serde(default)]
    pub add_field: BTreeMap<String, String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    #[serde(default)]
    pub on_source_error: SourceErrorPolicy,
}

fn default_interval() -> u64 {
    60
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodecKind {
    #[default]
    Plain,
    Json,
    JsonLines,
}

/// What a polling pass does when fetching one source fails with an error
/// other than rate limiting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceErrorPolicy {
    /// Log and move on to the next source.
    #[default]
    Skip,
    /// Stop the engine with the error.
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub endpoint: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    pub authorization: Option<String>,
}

fn default_timeout_seconds() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_buffer_limit")]
    pub buffer_limit: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            buffer_limit: default_buffer_limit(),
        }
    }
}

fn default_buffer_limit() -> usize {
    1000
}
