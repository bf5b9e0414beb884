use crate::api::{continuation, ApiError, LogApi};
use std::collections::HashSet;
use tracing::{debug, info};

/// Resolve configured log group names or prefixes into the concrete set of
/// sources to poll this pass.
///
/// Without prefix mode the configured list is returned verbatim. With it,
/// every prefix is paged to exhaustion and the union is returned in
/// first-seen order.
pub async fn discover_sources(
    api: &dyn LogApi,
    inputs: &[String],
    prefix_mode: bool,
) -> Result<Vec<String>, ApiError> {
    if !prefix_mode {
        debug!("log_group_prefix not enabled");
        return Ok(inputs.to_vec());
    }

    debug!("log_group_prefix enabled, searching for log groups");
    let mut seen = HashSet::new();
    let mut sources = Vec::new();

    for prefix in inputs {
        let mut next_token: Option<String> = None;
        let mut found = 0usize;

        loop {
            let page = api.list_sources(prefix, next_token.as_deref()).await?;
            found += page.sources.len();

            for source in page.sources {
                if seen.insert(source.clone()) {
                    sources.push(source);
                }
            }

            next_token = continuation(page.next_token);
            if next_token.is_none() {
                break;
            }
        }

        info!(prefix = %prefix, count = found, "Found log groups matching prefix");
    }

    Ok(sources)
}
