pub mod cache;

pub use cache::{normalize_tag_keys, TagCache, Tags, DEFAULT_FRESHNESS};
