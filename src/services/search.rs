//! Search orchestration
//!
//! Cache-aside over the injected engine and cache store:
//! normalize, derive key, try the cache, fall through to the engine, store
//! the mapped result, record history off the request path.
//!
//! A broken cache degrades the service instead of failing it: get/set
//! failures are logged at warn and the request proceeds against the engine
//! with `cached: false`. An engine failure is fatal to the request. Two
//! concurrent identical misses both hit the engine; the loser's write wins
//! and the entries are identical, so no single-flight guard is kept.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::CacheStore;
use crate::config::SearchConfig;
use crate::engine::{EngineResponse, SearchEngineClient};
use crate::models::{EchoedFilters, EchoedSort, SearchHit, SearchResult};
use crate::search::{
    build_query, build_suggest_query, search_cache_key, suggest_cache_key, SearchParameters,
    SEARCH_KEY_PREFIX,
};
use crate::services::history::HistoryRecorder;
use crate::Result;

pub struct SearchService {
    engine: Arc<dyn SearchEngineClient>,
    cache: Arc<dyn CacheStore>,
    history: Option<Arc<dyn HistoryRecorder>>,
    config: SearchConfig,
}

impl SearchService {
    pub fn new(
        engine: Arc<dyn SearchEngineClient>,
        cache: Arc<dyn CacheStore>,
        history: Option<Arc<dyn HistoryRecorder>>,
        config: SearchConfig,
    ) -> Self {
        Self {
            engine,
            cache,
            history,
            config,
        }
    }

    /// Execute a search from raw request items.
    ///
    /// Validation failures surface before any I/O is attempted.
    pub async fn search(
        &self,
        items: &[(String, String)],
        caller: Option<&str>,
    ) -> Result<SearchResult> {
        let params = SearchParameters::from_items(items)?;
        self.search_with_params(params, caller).await
    }

    /// Execute a search for already-normalized parameters.
    pub async fn search_with_params(
        &self,
        params: SearchParameters,
        caller: Option<&str>,
    ) -> Result<SearchResult> {
        let key = search_cache_key(&params);

        match self.cache.get(&key).await {
            Ok(Some(value)) => match serde_json::from_value::<SearchResult>(value) {
                Ok(mut result) => {
                    result.cached = true;
                    tracing::debug!(key = %key, "search cache hit");
                    self.record_history(&params, result.total, caller);
                    return Ok(result);
                }
                Err(error) => {
                    // A payload this store wrote but cannot read back is a
                    // bug or a schema change mid-deploy; treat as a miss.
                    tracing::warn!(key = %key, %error, "discarding undecodable cache entry");
                }
            },
            Ok(None) => {
                tracing::debug!(key = %key, "search cache miss");
            }
            Err(error) => {
                tracing::warn!(%error, "cache unavailable, serving search uncached");
            }
        }

        let query = build_query(&params);
        let response = self.engine.search(&query).await?;
        let result = map_response(&params, response);

        match serde_json::to_value(&result) {
            Ok(value) => {
                let ttl = Duration::from_secs(self.config.cache_ttl_seconds);
                if let Err(error) = self.cache.set(&key, &value, ttl).await {
                    tracing::warn!(%error, "failed to cache search result");
                }
            }
            Err(error) => {
                tracing::warn!(%error, "failed to serialize search result for caching");
            }
        }

        self.record_history(&params, result.total, caller);
        Ok(result)
    }

    /// Autocomplete suggestions for a message prefix.
    ///
    /// Prefixes shorter than the configured minimum return an empty list
    /// without touching any collaborator.
    pub async fn suggest(&self, prefix: &str) -> Result<Vec<String>> {
        let prefix = prefix.trim();
        if prefix.chars().count() < self.config.suggest_min_chars {
            return Ok(Vec::new());
        }

        let key = suggest_cache_key(prefix);
        match self.cache.get(&key).await {
            Ok(Some(value)) => match serde_json::from_value::<Vec<String>>(value) {
                Ok(suggestions) => return Ok(suggestions),
                Err(error) => {
                    tracing::warn!(key = %key, %error, "discarding undecodable suggest entry");
                }
            },
            Ok(None) => {}
            Err(error) => {
                tracing::warn!(%error, "cache unavailable, serving suggestions uncached");
            }
        }

        let query = build_suggest_query(prefix);
        let response = self.engine.search(&query).await?;
        let suggestions = response.suggestions;

        match serde_json::to_value(&suggestions) {
            Ok(value) => {
                let ttl = Duration::from_secs(self.config.suggest_ttl_seconds);
                if let Err(error) = self.cache.set(&key, &value, ttl).await {
                    tracing::warn!(%error, "failed to cache suggestions");
                }
            }
            Err(error) => {
                tracing::warn!(%error, "failed to serialize suggestions for caching");
            }
        }

        Ok(suggestions)
    }

    /// Drop every cached search result; called by the ingest path.
    pub async fn invalidate_search_cache(&self) -> Result<u64> {
        let removed = self.cache.delete_by_prefix(SEARCH_KEY_PREFIX).await?;
        tracing::info!(removed, "invalidated search result cache");
        Ok(removed)
    }

    /// Engine reachability, for health endpoints.
    pub async fn ping_engine(&self) -> Result<()> {
        self.engine.ping().await
    }

    fn record_history(&self, params: &SearchParameters, result_count: u64, caller: Option<&str>) {
        let Some(recorder) = &self.history else {
            return;
        };
        let recorder = Arc::clone(recorder);
        let params = params.clone();
        let caller = caller.map(str::to_string);
        tokio::spawn(async move {
            if let Err(error) = recorder.record(&params, result_count, caller.as_deref()).await {
                tracing::warn!(%error, "failed to record search history");
            }
        });
    }
}

/// Map an engine response into the wire shape. Stored and returned with
/// `cached: false`; retrieval stamps the flag.
fn map_response(params: &SearchParameters, response: EngineResponse) -> SearchResult {
    let total_pages = response.total.div_ceil(params.page_size as u64) as u32;

    SearchResult {
        total: response.total,
        page: params.page,
        page_size: params.page_size,
        total_pages,
        cached: false,
        results: response
            .hits
            .into_iter()
            .map(|hit| SearchHit {
                id: hit.id,
                score: hit.score,
                source: hit.source,
                highlight: hit.highlight,
            })
            .collect(),
        query: params.text.clone(),
        filters: EchoedFilters::from(params),
        sort: EchoedSort::from(params),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineHit;

    #[test]
    fn total_pages_rounds_up() {
        let params = SearchParameters {
            page_size: 20,
            ..SearchParameters::default()
        };
        let result = map_response(
            &params,
            EngineResponse {
                total: 41,
                ..EngineResponse::default()
            },
        );
        assert_eq!(result.total_pages, 3);
        assert!(!result.cached);
    }

    #[test]
    fn zero_matches_map_to_an_empty_page() {
        let params = SearchParameters::default();
        let result = map_response(&params, EngineResponse::default());
        assert_eq!(result.total, 0);
        assert_eq!(result.total_pages, 0);
        assert!(result.results.is_empty());
    }

    #[test]
    fn hits_carry_through_with_highlights() {
        let params = SearchParameters {
            text: Some("timeout".to_string()),
            ..SearchParameters::default()
        };
        let response = EngineResponse {
            total: 1,
            hits: vec![EngineHit {
                id: "a1".to_string(),
                score: Some(2.0),
                source: serde_json::json!({ "message": "timeout" }),
                highlight: Some(serde_json::json!({ "message": ["<mark>timeout</mark>"] })),
            }],
            suggestions: vec![],
        };
        let result = map_response(&params, response);
        assert_eq!(result.results[0].id, "a1");
        assert!(result.results[0].highlight.is_some());
        assert_eq!(result.query.as_deref(), Some("timeout"));
    }
}
