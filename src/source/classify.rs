use std::fmt;

/// Service a log group belongs to, derived from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    Rds,
    OpenSearch,
    ElastiCache,
    Unknown,
}

impl SourceType {
    pub fn classify(source: &str) -> Self {
        let lowered = source.to_ascii_lowercase();

        if source.starts_with("/aws/rds/") {
            SourceType::Rds
        } else if lowered.contains("/aws/opensearchservice/") {
            SourceType::OpenSearch
        } else if lowered.contains("/aws/elasticcache/") {
            SourceType::ElastiCache
        } else {
            SourceType::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Rds => "rds",
            SourceType::OpenSearch => "opensearch",
            SourceType::ElastiCache => "elasticache",
            SourceType::Unknown => "unknown log type",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
