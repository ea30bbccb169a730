//! Search parameter normalization
//!
//! Turns the raw, loosely-typed key/value items of a search request into a
//! canonical [`SearchParameters`] value. The policy is clamp-or-drop:
//! - merely-wrong values (unknown level, unparseable date, oversized text)
//!   degrade to safe defaults or are dropped, never rejected
//! - only pagination values that cannot be read as integers at all produce
//!   a [`crate::Error::Validation`]
//!
//! Two logically identical requests must normalize to the same value
//! field-for-field; the cache key's determinism depends on it.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;

use crate::Result;

/// Free text is truncated to this many characters.
pub const MAX_TEXT_LEN: usize = 500;
/// Bounded string filters (service, log type, user id) are truncated to this.
pub const MAX_FILTER_LEN: usize = 100;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MIN_PAGE_SIZE: u32 = 1;
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Date formats accepted for `date_from` / `date_to`. Anything else is
/// dropped, not rejected.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%SZ",
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%Y-%m-%d %H:%M:%S",
];

lazy_static! {
    // Strip anything that could be mistaken for query syntax by the engine.
    // Keeps word characters, whitespace and a small set of benign punctuation.
    static ref UNSAFE_CHARS: Regex = Regex::new(r#"[^\w\s\-@.+'"]+"#).expect("valid regex");
    static ref WHITESPACE_RUNS: Regex = Regex::new(r"\s+").expect("valid regex");
}

/// Canonical, normalized search parameters.
///
/// The sole input to both the query builder and the cache key deriver.
/// Immutable once built; owned by a single request's execution.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParameters {
    /// Free-text query, sanitized and length-bounded. Empty input is absent.
    pub text: Option<String>,
    /// Log level filter; values outside the whitelist are dropped.
    pub level: Option<LogLevel>,
    /// Service name filter.
    pub service: Option<String>,
    /// Log type filter (transaction, error, fraud, ...).
    pub log_type: Option<String>,
    /// User identifier filter, numeric-coerced where possible.
    pub user_id: Option<UserIdFilter>,
    /// Inclusive lower bound on `@timestamp`.
    pub date_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `@timestamp`.
    pub date_to: Option<DateTime<Utc>>,
    /// Inclusive lower bound on `amount`.
    pub min_amount: Option<f64>,
    /// Inclusive upper bound on `amount`.
    pub max_amount: Option<f64>,
    /// 1-indexed page number, always >= 1.
    pub page: u32,
    /// Results per page, always within [1, 1000].
    pub page_size: u32,
    /// Sort field from the sortable whitelist.
    pub sort_field: SortField,
    pub sort_order: SortOrder,
}

/// Valid log levels, matching the corpus schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// Case-insensitive parse against the whitelist.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Some(Self::Debug),
            "INFO" => Some(Self::Info),
            "WARNING" => Some(Self::Warning),
            "ERROR" => Some(Self::Error),
            "CRITICAL" => Some(Self::Critical),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }
}

/// User identifier filter representation.
///
/// The engine may index `user_id` as numeric or keyword depending on the
/// ingested data. The representation is decided once here and carried
/// through immutably; an exact-match filter sent in the wrong representation
/// against a typed field returns nothing at all rather than erroring, which
/// is the failure mode this avoids.
#[derive(Debug, Clone, PartialEq)]
pub enum UserIdFilter {
    /// Exact numeric term match against `user_id`.
    Numeric(i64),
    /// Exact keyword match against `user_id.keyword`.
    Keyword(String),
}

impl UserIdFilter {
    fn from_sanitized(value: String) -> Self {
        match value.parse::<i64>() {
            Ok(n) => Self::Numeric(n),
            Err(_) => Self::Keyword(value),
        }
    }

    /// Canonical string form, used for cache keys and echoed filters.
    pub fn canonical(&self) -> String {
        match self {
            Self::Numeric(n) => n.to_string(),
            Self::Keyword(s) => s.clone(),
        }
    }
}

/// Fields the engine allows sorting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Timestamp,
    Amount,
    ResponseTime,
    FraudScore,
}

impl SortField {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "@timestamp" | "timestamp" => Some(Self::Timestamp),
            "amount" => Some(Self::Amount),
            "response_time" => Some(Self::ResponseTime),
            "fraud_score" => Some(Self::FraudScore),
            _ => None,
        }
    }

    /// Engine-side field name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Timestamp => "@timestamp",
            Self::Amount => "amount",
            Self::ResponseTime => "response_time",
            Self::FraudScore => "fraud_score",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl Default for SearchParameters {
    fn default() -> Self {
        Self {
            text: None,
            level: None,
            service: None,
            log_type: None,
            user_id: None,
            date_from: None,
            date_to: None,
            min_amount: None,
            max_amount: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            sort_field: SortField::default(),
            sort_order: SortOrder::default(),
        }
    }
}

impl SearchParameters {
    /// Parse search parameters from ordered (key, value) items.
    ///
    /// Unknown keys are ignored. When a key repeats, the last occurrence
    /// wins; the result is the same regardless of key ordering otherwise.
    pub fn from_items(items: &[(String, String)]) -> Result<Self> {
        let mut params = Self::default();

        for (key, value) in items {
            match key.as_str() {
                "q" | "query" | "text" => {
                    params.text = sanitize_text(value, MAX_TEXT_LEN);
                }
                "level" => {
                    params.level = LogLevel::parse(value);
                    if params.level.is_none() && !value.trim().is_empty() {
                        tracing::warn!(level = %value, "dropping unrecognized log level");
                    }
                }
                "service" => {
                    params.service = sanitize_text(value, MAX_FILTER_LEN);
                }
                "log_type" => {
                    params.log_type = sanitize_text(value, MAX_FILTER_LEN);
                }
                "user_id" => {
                    params.user_id =
                        sanitize_text(value, MAX_FILTER_LEN).map(UserIdFilter::from_sanitized);
                }
                "date_from" | "from" => {
                    params.date_from = parse_date(value);
                    if params.date_from.is_none() && !value.trim().is_empty() {
                        tracing::warn!(date = %value, "dropping unparseable date_from");
                    }
                }
                "date_to" | "to" => {
                    params.date_to = parse_date(value);
                    if params.date_to.is_none() && !value.trim().is_empty() {
                        tracing::warn!(date = %value, "dropping unparseable date_to");
                    }
                }
                "min_amount" => {
                    params.min_amount = parse_amount(value);
                }
                "max_amount" => {
                    params.max_amount = parse_amount(value);
                }
                "page" => {
                    let parsed: i64 = value.trim().parse().map_err(|_| {
                        crate::Error::Validation(format!("Invalid page value: {}", value))
                    })?;
                    params.page = parsed.max(1).min(u32::MAX as i64) as u32;
                }
                "page_size" | "size" => {
                    let parsed: i64 = value.trim().parse().map_err(|_| {
                        crate::Error::Validation(format!("Invalid page_size value: {}", value))
                    })?;
                    params.page_size =
                        parsed.clamp(MIN_PAGE_SIZE as i64, MAX_PAGE_SIZE as i64) as u32;
                }
                "sort_field" | "sort" => {
                    params.sort_field = SortField::parse(value).unwrap_or_default();
                }
                "sort_order" | "order" => {
                    params.sort_order = SortOrder::parse(value).unwrap_or_default();
                }
                _ => {
                    tracing::debug!(key = %key, "ignoring unknown search parameter");
                }
            }
        }

        // Inverted numeric ranges are swapped rather than rejected, matching
        // the clamp-don't-reject posture of every other field.
        if let (Some(min), Some(max)) = (params.min_amount, params.max_amount) {
            if min > max {
                tracing::warn!(min_amount = min, max_amount = max, "swapping inverted amount range");
                params.min_amount = Some(max);
                params.max_amount = Some(min);
            }
        }
        if let (Some(from), Some(to)) = (params.date_from, params.date_to) {
            if from > to {
                tracing::warn!("swapping inverted date range");
                params.date_from = Some(to);
                params.date_to = Some(from);
            }
        }

        Ok(params)
    }

    /// Translate 1-indexed pagination into the engine's 0-indexed offset.
    pub fn offset(&self) -> u32 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

/// Sanitize free text for safe querying: strip characters that could be
/// mistaken for query syntax, collapse whitespace runs, truncate, and treat
/// the empty result as absent.
fn sanitize_text(value: &str, max_len: usize) -> Option<String> {
    let cleaned = UNSAFE_CHARS.replace_all(value, " ");
    let collapsed = WHITESPACE_RUNS.replace_all(&cleaned, " ");
    let trimmed = collapsed.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(max_len).collect())
}

/// Parse a date string against the accepted absolute formats.
fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    None
}

/// Parse an amount bound; unparseable or negative values are dropped.
fn parse_amount(value: &str) -> Option<f64> {
    let parsed: f64 = value.trim().parse().ok()?;
    if parsed.is_finite() && parsed >= 0.0 {
        Some(parsed)
    } else {
        None
    }
}
