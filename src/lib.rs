//! Cached search facade over a continuously growing log corpus
//!
//! The surrounding platform hands this crate loosely-typed request
//! parameters; it hands back a structured, cache-aware search result:
//!
//! - `search::params` normalizes raw items into canonical [`search::SearchParameters`]
//! - `search::query` builds the engine query DSL from them
//! - `search::cache_key` derives the deterministic `search:` cache key
//! - `cache` holds the [`cache::CacheStore`] trait with redis and in-memory stores
//! - `engine` holds the [`engine::SearchEngineClient`] trait and the
//!   Elasticsearch HTTP client
//! - `services` wires it together: the cache-aside [`SearchService`],
//!   best-effort history recording, and ingest-triggered invalidation
//!
//! HTTP routing, auth and ingestion live in the surrounding platform; the
//! write path is expected to call [`SearchService::invalidate_search_cache`]
//! (or [`services::CacheInvalidator`]) after every bulk ingest.

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod models;
pub mod search;
pub mod services;

pub use config::Config;
pub use error::{Error, Result};
pub use models::{SearchHit, SearchResult};
pub use services::SearchService;
