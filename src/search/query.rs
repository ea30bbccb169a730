//! Engine query construction
//!
//! Pure translation from [`SearchParameters`] to the engine's query DSL.
//! Every present filter contributes exactly one clause; absent fields
//! contribute nothing at all. An empty `bool` query matches the whole
//! corpus, so no placeholder clause is ever emitted for the
//! filters-only or match-everything cases.

use serde::Serialize;
use serde_json::{json, Map, Value};

use super::format_timestamp;
use super::params::{SearchParameters, UserIdFilter};

/// Text-typed fields eligible for full-text matching, with relevance
/// boosts. Identifier and numeric fields stay out; fuzzy-matching an id
/// is a correctness bug, not a feature.
const FULLTEXT_FIELDS: &[&str] = &[
    "message^3",
    "error_message^2",
    "endpoint",
    "service",
    "action",
    "product_id",
];

/// Unboosted field list for autocomplete prefix matching.
const SUGGEST_FIELDS: &[&str] = &["message", "service", "endpoint", "action"];

const HIGHLIGHT_FRAGMENT_SIZE: u32 = 150;
const SUGGEST_BUCKET_SIZE: u32 = 10;

/// A fully built engine query, ready to serialize as the request body.
/// Built fresh on every cache miss; results are cached, queries are not.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StructuredQuery(Value);

impl StructuredQuery {
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

/// Build the search query body for a normalized request.
pub fn build_query(params: &SearchParameters) -> StructuredQuery {
    let mut must: Vec<Value> = Vec::new();
    let mut filter: Vec<Value> = Vec::new();

    if let Some(text) = &params.text {
        must.push(json!({
            "multi_match": {
                "query": text,
                "fields": FULLTEXT_FIELDS,
                "type": "best_fields",
                "operator": "or",
                "fuzziness": "AUTO",
                "minimum_should_match": "75%"
            }
        }));
    }

    if let Some(level) = params.level {
        filter.push(json!({ "term": { "level.keyword": level.as_str() } }));
    }
    if let Some(service) = &params.service {
        filter.push(json!({ "term": { "service.keyword": service } }));
    }
    if let Some(log_type) = &params.log_type {
        filter.push(json!({ "term": { "log_type.keyword": log_type } }));
    }
    if let Some(user_id) = &params.user_id {
        // The representation was fixed during normalization; an exact match
        // in the wrong representation silently matches nothing.
        filter.push(match user_id {
            UserIdFilter::Numeric(n) => json!({ "term": { "user_id": n } }),
            UserIdFilter::Keyword(s) => json!({ "term": { "user_id.keyword": s } }),
        });
    }
    if let Some(clause) = range_clause(
        "@timestamp",
        params.date_from.as_ref().map(format_timestamp),
        params.date_to.as_ref().map(format_timestamp),
    ) {
        filter.push(clause);
    }
    if let Some(clause) = range_clause("amount", params.min_amount, params.max_amount) {
        filter.push(clause);
    }

    let mut bool_query = Map::new();
    if !must.is_empty() {
        bool_query.insert("must".to_string(), Value::Array(must));
    }
    if !filter.is_empty() {
        bool_query.insert("filter".to_string(), Value::Array(filter));
    }

    let mut body = Map::new();
    body.insert("query".to_string(), json!({ "bool": bool_query }));
    body.insert("from".to_string(), json!(params.offset()));
    body.insert("size".to_string(), json!(params.page_size));
    body.insert(
        "sort".to_string(),
        json!([{ params.sort_field.as_str(): { "order": params.sort_order.as_str() } }]),
    );

    if params.text.is_some() {
        body.insert(
            "highlight".to_string(),
            json!({
                "fields": {
                    "message": { "fragment_size": HIGHLIGHT_FRAGMENT_SIZE },
                    "error_message": { "fragment_size": HIGHLIGHT_FRAGMENT_SIZE }
                },
                "pre_tags": ["<mark>"],
                "post_tags": ["</mark>"]
            }),
        );
    }

    StructuredQuery(Value::Object(body))
}

/// Build the autocomplete query body: prefix matching plus a terms
/// aggregation that yields the suggestion buckets. Hit bodies are not
/// needed, only the aggregation, so `size` is zero.
pub fn build_suggest_query(prefix: &str) -> StructuredQuery {
    StructuredQuery(json!({
        "query": {
            "multi_match": {
                "query": prefix,
                "fields": SUGGEST_FIELDS,
                "type": "phrase_prefix"
            }
        },
        "aggs": {
            "suggestions": {
                "terms": {
                    "field": "message.keyword",
                    "size": SUGGEST_BUCKET_SIZE
                }
            }
        },
        "size": 0
    }))
}

/// Inclusive range clause; `None` when both bounds are absent.
fn range_clause<T: Serialize>(field: &str, lower: Option<T>, upper: Option<T>) -> Option<Value> {
    if lower.is_none() && upper.is_none() {
        return None;
    }
    let mut bounds = Map::new();
    if let Some(lower) = lower {
        bounds.insert("gte".to_string(), json!(lower));
    }
    if let Some(upper) = upper {
        bounds.insert("lte".to_string(), json!(upper));
    }
    Some(json!({ "range": { field: bounds } }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::params::{LogLevel, SortField, SortOrder};
    use chrono::{TimeZone, Utc};

    fn query_value(params: &SearchParameters) -> Value {
        build_query(params).into_value()
    }

    #[test]
    fn empty_params_build_an_empty_bool_query() {
        let body = query_value(&SearchParameters::default());
        assert_eq!(body["query"]["bool"], json!({}));
        assert!(!body.to_string().contains("match_all"));
        assert_eq!(body["from"], json!(0));
        assert_eq!(body["size"], json!(20));
        assert_eq!(body["sort"], json!([{ "@timestamp": { "order": "desc" } }]));
        assert!(body.get("highlight").is_none());
    }

    #[test]
    fn text_builds_boosted_multi_match_and_highlight() {
        let params = SearchParameters {
            text: Some("payment timeout".to_string()),
            ..SearchParameters::default()
        };
        let body = query_value(&params);

        let must = body["query"]["bool"]["must"].as_array().unwrap();
        assert_eq!(must.len(), 1);
        let mm = &must[0]["multi_match"];
        assert_eq!(mm["query"], json!("payment timeout"));
        assert_eq!(mm["fields"][0], json!("message^3"));
        assert_eq!(mm["fuzziness"], json!("AUTO"));
        assert_eq!(mm["minimum_should_match"], json!("75%"));

        let highlight = &body["highlight"];
        assert!(highlight["fields"].get("message").is_some());
        assert_eq!(highlight["pre_tags"], json!(["<mark>"]));
    }

    #[test]
    fn each_present_filter_contributes_one_clause() {
        let params = SearchParameters {
            level: Some(LogLevel::Error),
            service: Some("payment".to_string()),
            log_type: Some("transaction".to_string()),
            ..SearchParameters::default()
        };
        let body = query_value(&params);

        let filter = body["query"]["bool"]["filter"].as_array().unwrap();
        assert_eq!(filter.len(), 3);
        assert!(filter.contains(&json!({ "term": { "level.keyword": "ERROR" } })));
        assert!(filter.contains(&json!({ "term": { "service.keyword": "payment" } })));
        assert!(body["query"]["bool"].get("must").is_none());
    }

    #[test]
    fn user_id_representation_picks_the_field() {
        let params = SearchParameters {
            user_id: Some(UserIdFilter::Numeric(42)),
            ..SearchParameters::default()
        };
        let filter = query_value(&params)["query"]["bool"]["filter"].clone();
        assert_eq!(filter[0], json!({ "term": { "user_id": 42 } }));

        let params = SearchParameters {
            user_id: Some(UserIdFilter::Keyword("user-77".to_string())),
            ..SearchParameters::default()
        };
        let filter = query_value(&params)["query"]["bool"]["filter"].clone();
        assert_eq!(filter[0], json!({ "term": { "user_id.keyword": "user-77" } }));
    }

    #[test]
    fn ranges_are_inclusive_and_tolerate_open_ends() {
        let params = SearchParameters {
            date_from: Some(Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap()),
            min_amount: Some(100.0),
            max_amount: Some(900.0),
            ..SearchParameters::default()
        };
        let body = query_value(&params);
        let filter = body["query"]["bool"]["filter"].as_array().unwrap();

        assert!(filter.contains(&json!({
            "range": { "@timestamp": { "gte": "2025-12-01T00:00:00Z" } }
        })));
        assert!(filter.contains(&json!({
            "range": { "amount": { "gte": 100.0, "lte": 900.0 } }
        })));
    }

    #[test]
    fn pagination_and_sort_are_translated() {
        let params = SearchParameters {
            page: 3,
            page_size: 50,
            sort_field: SortField::Amount,
            sort_order: SortOrder::Asc,
            ..SearchParameters::default()
        };
        let body = query_value(&params);
        assert_eq!(body["from"], json!(100));
        assert_eq!(body["size"], json!(50));
        assert_eq!(body["sort"], json!([{ "amount": { "order": "asc" } }]));
    }

    #[test]
    fn suggest_query_aggregates_without_hits() {
        let body = build_suggest_query("time").into_value();
        assert_eq!(body["size"], json!(0));
        assert_eq!(body["query"]["multi_match"]["type"], json!("phrase_prefix"));
        assert_eq!(
            body["aggs"]["suggestions"]["terms"]["field"],
            json!("message.keyword")
        );
    }
}
