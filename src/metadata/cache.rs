use crate::api::{ApiError, LogApi};
use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Tags are kept ordered so rendered events are stable.
pub type Tags = BTreeMap<String, String>;

/// Tags older than this are fetched again.
pub const DEFAULT_FRESHNESS: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone)]
struct TagEntry {
    tags: Tags,
    last_updated: Instant,
}

/// Per-source tag cache with a freshness window.
#[derive(Debug)]
pub struct TagCache {
    entries: HashMap<String, TagEntry>,
    freshness: Duration,
}

impl Default for TagCache {
    fn default() -> Self {
        Self::new(DEFAULT_FRESHNESS)
    }
}

impl TagCache {
    pub fn new(freshness: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            freshness,
        }
    }

    pub async fn get(&mut self, api: &dyn LogApi, source: &str) -> Result<Tags, ApiError> {
        self.get_at(api, source, Instant::now()).await
    }

    /// Return tags for `source` as of `now`, refreshing them when missing
    /// or stale. A failed refresh falls back to stale tags unless the
    /// failure is rate limiting.
    pub async fn get_at(
        &mut self,
        api: &dyn LogApi,
        source: &str,
        now: Instant,
    ) -> Result<Tags, ApiError> {
        if let Some(entry) = self.entries.get(source) {
            if now.saturating_duration_since(entry.last_updated) <= self.freshness {
                return Ok(entry.tags.clone());
            }
        }

        info!(source = %source, "Fetching tags");
        match api.list_tags(source).await {
            Ok(raw) => {
                let tags = normalize_tag_keys(raw);
                self.entries.insert(
                    source.to_string(),
                    TagEntry {
                        tags: tags.clone(),
                        last_updated: now,
                    },
                );
                Ok(tags)
            }
            Err(e) if e.is_throttled() => Err(e),
            Err(e) => match self.entries.get(source) {
                Some(stale) => {
                    warn!(source = %source, error = %e, "Tag refresh failed, using stale tags");
                    Ok(stale.tags.clone())
                }
                None => Err(e),
            },
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Strip whitespace from tag keys; downstream indexes reject field names
/// with spaces. Keys are visited in sorted order and a stripped key
/// overwrites any existing value.
pub fn normalize_tag_keys(raw: HashMap<String, String>) -> Tags {
    let sorted: BTreeMap<String, String> = raw.into_iter().collect();
    let mut tags = Tags::new();

    for (key, value) in sorted {
        if key.chars().any(char::is_whitespace) {
            let stripped: String = key.chars().filter(|c| !c.is_whitespace()).collect();
            tags.insert(stripped, value);
        } else {
            tags.entry(key).or_insert(value);
        }
    }

    tags
}
