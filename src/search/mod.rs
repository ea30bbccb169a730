//! Search request pipeline: normalization, query construction, cache keys

pub mod cache_key;
pub mod params;
pub mod query;

pub use cache_key::{search_cache_key, suggest_cache_key, SEARCH_KEY_PREFIX, SUGGEST_KEY_PREFIX};
pub use params::{LogLevel, SearchParameters, SortField, SortOrder, UserIdFilter};
pub use query::{build_query, build_suggest_query, StructuredQuery};

use chrono::{DateTime, Utc};

/// Canonical timestamp rendering used in queries, cache keys and echoed
/// filters. One format everywhere keeps the cache key a pure function of
/// the normalized parameters.
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
