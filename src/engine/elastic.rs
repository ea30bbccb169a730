//! Elasticsearch HTTP client

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use super::{EngineHit, EngineResponse, SearchEngineClient};
use crate::config::ElasticsearchConfig;
use crate::search::StructuredQuery;
use crate::{Error, Result};

pub struct ElasticsearchClient {
    http: reqwest::Client,
    base_url: Url,
    index: String,
}

impl ElasticsearchClient {
    /// Build a client with a bounded request timeout. A hung engine fails
    /// the request after the timeout instead of holding the caller open.
    pub fn new(config: &ElasticsearchConfig) -> Result<Self> {
        let base_url = Url::parse(&config.url)
            .map_err(|e| Error::Config(format!("invalid elasticsearch url: {e}")))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Internal(format!("failed to build http client: {e}")))?;
        Ok(Self {
            http,
            base_url,
            index: config.index.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::Internal(format!("invalid engine path {path}: {e}")))
    }
}

#[async_trait]
impl SearchEngineClient for ElasticsearchClient {
    async fn search(&self, query: &StructuredQuery) -> Result<EngineResponse> {
        let url = self.endpoint(&format!("{}/_search", self.index))?;

        let response = self
            .http
            .post(url)
            .json(query.as_value())
            .send()
            .await
            .map_err(|e| Error::EngineUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "search engine rejected query");
            return Err(Error::EngineUnavailable(format!(
                "engine returned {status}"
            )));
        }

        let raw: RawSearchResponse = response
            .json()
            .await
            .map_err(|e| Error::EngineUnavailable(format!("unreadable engine response: {e}")))?;

        Ok(raw.into())
    }

    async fn ping(&self) -> Result<()> {
        let response = self
            .http
            .get(self.base_url.clone())
            .send()
            .await
            .map_err(|e| Error::EngineUnavailable(e.to_string()))?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Error::EngineUnavailable(format!(
                "engine ping returned {}",
                response.status()
            )))
        }
    }
}

#[derive(Deserialize)]
struct RawSearchResponse {
    hits: RawHits,
    #[serde(default)]
    aggregations: Option<RawAggregations>,
}

#[derive(Deserialize)]
struct RawHits {
    total: RawTotal,
    #[serde(default)]
    hits: Vec<RawHit>,
}

#[derive(Deserialize)]
struct RawTotal {
    value: u64,
}

#[derive(Deserialize)]
struct RawHit {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_score")]
    score: Option<f64>,
    #[serde(rename = "_source")]
    source: Value,
    highlight: Option<Value>,
}

#[derive(Deserialize)]
struct RawAggregations {
    #[serde(default)]
    suggestions: Option<RawTermsAgg>,
}

#[derive(Deserialize)]
struct RawTermsAgg {
    #[serde(default)]
    buckets: Vec<RawBucket>,
}

#[derive(Deserialize)]
struct RawBucket {
    key: String,
}

impl From<RawSearchResponse> for EngineResponse {
    fn from(raw: RawSearchResponse) -> Self {
        let suggestions = raw
            .aggregations
            .and_then(|aggs| aggs.suggestions)
            .map(|agg| agg.buckets.into_iter().map(|b| b.key).collect())
            .unwrap_or_default();

        EngineResponse {
            total: raw.hits.total.value,
            hits: raw
                .hits
                .hits
                .into_iter()
                .map(|h| EngineHit {
                    id: h.id,
                    score: h.score,
                    source: h.source,
                    highlight: h.highlight,
                })
                .collect(),
            suggestions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_hits_and_total() {
        let raw: RawSearchResponse = serde_json::from_value(json!({
            "took": 4,
            "hits": {
                "total": { "value": 2, "relation": "eq" },
                "hits": [
                    {
                        "_id": "a1",
                        "_score": 1.5,
                        "_source": { "message": "payment timeout" },
                        "highlight": { "message": ["payment <mark>timeout</mark>"] }
                    },
                    { "_id": "a2", "_score": null, "_source": { "message": "ok" } }
                ]
            }
        }))
        .unwrap();

        let response = EngineResponse::from(raw);
        assert_eq!(response.total, 2);
        assert_eq!(response.hits.len(), 2);
        assert_eq!(response.hits[0].id, "a1");
        assert!(response.hits[0].highlight.is_some());
        assert_eq!(response.hits[1].score, None);
        assert!(response.suggestions.is_empty());
    }

    #[test]
    fn parses_suggestion_buckets() {
        let raw: RawSearchResponse = serde_json::from_value(json!({
            "hits": { "total": { "value": 0 }, "hits": [] },
            "aggregations": {
                "suggestions": {
                    "buckets": [
                        { "key": "timeout connecting upstream", "doc_count": 12 },
                        { "key": "timeout waiting for lock", "doc_count": 3 }
                    ]
                }
            }
        }))
        .unwrap();

        let response = EngineResponse::from(raw);
        assert_eq!(
            response.suggestions,
            vec![
                "timeout connecting upstream".to_string(),
                "timeout waiting for lock".to_string()
            ]
        );
    }
}
