//! Cache key derivation
//!
//! Keys are a pure function of the normalized parameters: present fields
//! sorted by name, rendered `name=value` and joined with `&`, hashed with
//! sha256. No clock, no randomness. Two requests that normalize to the same
//! [`SearchParameters`] always share one key; any single differing field
//! yields a different one.

use sha2::{Digest, Sha256};

use super::format_timestamp;
use super::params::SearchParameters;

/// Namespace prefix for search result entries. Bulk invalidation matches on
/// this prefix and nothing else.
pub const SEARCH_KEY_PREFIX: &str = "search:";

/// Namespace prefix for autocomplete entries. Deliberately outside the
/// `search:` namespace so ingest-triggered invalidation leaves it alone.
pub const SUGGEST_KEY_PREFIX: &str = "autocomplete:";

/// Derive the cache key for a normalized search request.
pub fn search_cache_key(params: &SearchParameters) -> String {
    let mut fields: Vec<(&str, String)> = Vec::with_capacity(13);

    if let Some(text) = &params.text {
        fields.push(("text", text.clone()));
    }
    if let Some(level) = params.level {
        fields.push(("level", level.as_str().to_string()));
    }
    if let Some(service) = &params.service {
        fields.push(("service", service.clone()));
    }
    if let Some(log_type) = &params.log_type {
        fields.push(("log_type", log_type.clone()));
    }
    if let Some(user_id) = &params.user_id {
        fields.push(("user_id", user_id.canonical()));
    }
    if let Some(from) = &params.date_from {
        fields.push(("date_from", format_timestamp(from)));
    }
    if let Some(to) = &params.date_to {
        fields.push(("date_to", format_timestamp(to)));
    }
    if let Some(min) = params.min_amount {
        fields.push(("min_amount", min.to_string()));
    }
    if let Some(max) = params.max_amount {
        fields.push(("max_amount", max.to_string()));
    }
    fields.push(("page", params.page.to_string()));
    fields.push(("page_size", params.page_size.to_string()));
    fields.push(("sort_field", params.sort_field.as_str().to_string()));
    fields.push(("sort_order", params.sort_order.as_str().to_string()));

    fields.sort_by(|a, b| a.0.cmp(b.0));

    let canonical = fields
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let digest = Sha256::digest(canonical.as_bytes());
    format!("{SEARCH_KEY_PREFIX}{}", hex::encode(digest))
}

/// Derive the cache key for an autocomplete prefix. Case-insensitive on
/// purpose: "Time" and "time" suggest the same completions.
pub fn suggest_cache_key(prefix: &str) -> String {
    format!("{SUGGEST_KEY_PREFIX}{}", prefix.trim().to_lowercase())
}
