//! Response DTOs for the search facade

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::search::params::{SearchParameters, UserIdFilter};

/// One matching log document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub source: Value,
    /// Highlighted fragments, present only when the request carried text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<Value>,
}

/// The full search response. This is the value that goes into the cache,
/// always with `cached: false`; the flag is stamped `true` at retrieval so
/// consumers can tell the provenance of what they received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub cached: bool,
    pub results: Vec<SearchHit>,
    /// The normalized free-text query, echoed back; `null` when the request
    /// carried none.
    pub query: Option<String>,
    pub filters: EchoedFilters,
    pub sort: EchoedSort,
}

/// The filters that were actually applied, after normalization. Callers see
/// what the facade did with their input, not what they sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EchoedFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_type: Option<String>,
    /// JSON number or string, matching the representation used to filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EchoedSort {
    pub field: String,
    pub order: String,
}

impl From<&SearchParameters> for EchoedFilters {
    fn from(params: &SearchParameters) -> Self {
        Self {
            level: params.level.map(|l| l.as_str().to_string()),
            service: params.service.clone(),
            log_type: params.log_type.clone(),
            user_id: params.user_id.as_ref().map(|u| match u {
                UserIdFilter::Numeric(n) => Value::from(*n),
                UserIdFilter::Keyword(s) => Value::from(s.clone()),
            }),
            date_from: params.date_from.as_ref().map(crate::search::format_timestamp),
            date_to: params.date_to.as_ref().map(crate::search::format_timestamp),
            min_amount: params.min_amount,
            max_amount: params.max_amount,
        }
    }
}

impl From<&SearchParameters> for EchoedSort {
    fn from(params: &SearchParameters) -> Self {
        Self {
            field: params.sort_field.as_str().to_string(),
            order: params.sort_order.as_str().to_string(),
        }
    }
}
