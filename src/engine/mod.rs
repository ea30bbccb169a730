//! Search engine abstraction
//!
//! The orchestrator depends on [`SearchEngineClient`]; the concrete
//! Elasticsearch client lives in [`elastic`]. Tests substitute their own
//! implementation.

pub mod elastic;

use async_trait::async_trait;
use serde_json::Value;

use crate::search::StructuredQuery;
use crate::Result;

pub use elastic::ElasticsearchClient;

/// One raw hit as returned by the engine, before response mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineHit {
    pub id: String,
    pub score: Option<f64>,
    pub source: Value,
    pub highlight: Option<Value>,
}

/// Engine response, reduced to what the facade consumes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineResponse {
    pub total: u64,
    pub hits: Vec<EngineHit>,
    /// Suggestion bucket keys, populated only for autocomplete queries.
    pub suggestions: Vec<String>,
}

#[async_trait]
pub trait SearchEngineClient: Send + Sync {
    /// Execute a query. Any transport failure, timeout or non-success
    /// response is [`crate::Error::EngineUnavailable`]; it is never
    /// converted into an empty result set.
    async fn search(&self, query: &StructuredQuery) -> Result<EngineResponse>;

    /// Reachability probe for operators.
    async fn ping(&self) -> Result<()>;
}
