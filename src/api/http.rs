use super::types::{FetchRequest, LogRecord, RecordPage, SourcePage};
use super::{continuation, ApiError, LogApi, Result};
use crate::config::types::ApiConfig;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

const TARGET_PREFIX: &str = "Logs_20140328";
const CONTENT_TYPE: &str = "application/x-amz-json-1.1";

/// Client for the CloudWatch Logs JSON protocol.
///
/// Requests are not signed; point `endpoint` at a local emulator or a
/// signing proxy.
#[derive(Debug)]
pub struct HttpLogApi {
    endpoint: String,
    authorization: Option<String>,
    client: reqwest::Client,
}

impl HttpLogApi {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            authorization: config.authorization.clone(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call<B, R>(&self, operation: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let mut request = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE)
            .header("X-Amz-Target", format!("{}.{}", TARGET_PREFIX, operation))
            .json(body);

        if let Some(auth) = &self.authorization {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(error_from_response(status, &bytes));
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn error_from_response(status: StatusCode, body: &[u8]) -> ApiError {
    let parsed: Option<ErrorBody> = serde_json::from_slice(body).ok();
    let (code, message) = match parsed {
        Some(err) => (
            err.kind.unwrap_or_else(|| status.as_u16().to_string()),
            err.message.unwrap_or_default(),
        ),
        None => (
            status.as_u16().to_string(),
            String::from_utf8_lossy(body).into_owned(),
        ),
    };

    if status == StatusCode::TOO_MANY_REQUESTS || code.ends_with("ThrottlingException") {
        ApiError::Throttled(message)
    } else {
        ApiError::Service { code, message }
    }
}

#[async_trait]
impl LogApi for HttpLogApi {
    async fn list_sources(&self, prefix: &str, next_token: Option<&str>) -> Result<SourcePage> {
        let body = DescribeLogGroupsRequest {
            log_group_name_prefix: prefix,
            next_token,
        };
        let resp: DescribeLogGroupsResponse = self.call("DescribeLogGroups", &body).await?;

        Ok(SourcePage {
            sources: resp.log_groups.into_iter().map(|g| g.log_group_name).collect(),
            next_token: continuation(resp.next_token),
        })
    }

    async fn list_tags(&self, source: &str) -> Result<HashMap<String, String>> {
        let body = ListTagsRequest {
            log_group_name: source,
        };
        let resp: ListTagsResponse = self.call("ListTagsLogGroup", &body).await?;
        Ok(resp.tags)
    }

    async fn fetch_records(&self, request: &FetchRequest) -> Result<RecordPage> {
        let body = FilterLogEventsRequest {
            log_group_name: &request.source,
            start_time: request.start_time,
            next_token: request.next_token.as_deref(),
            interleaved: request.interleaved,
        };
        let resp: FilterLogEventsResponse = self.call("FilterLogEvents", &body).await?;

        Ok(RecordPage {
            records: resp.events,
            next_token: continuation(resp.next_token),
        })
    }
}

// ===== Wire Types =====

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DescribeLogGroupsRequest<'a> {
    log_group_name_prefix: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_token: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescribeLogGroupsResponse {
    #[serde(default)]
    log_groups: Vec<LogGroup>,
    next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LogGroup {
    log_group_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListTagsRequest<'a> {
    log_group_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct ListTagsResponse {
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FilterLogEventsRequest<'a> {
    log_group_name: &'a str,
    start_time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_token: Option<&'a str>,
    interleaved: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FilterLogEventsResponse {
    #[serde(default)]
    events: Vec<LogRecord>,
    next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "__type")]
    kind: Option<String>,
    #[serde(alias = "Message")]
    message: Option<String>,
}
