//! Cache store abstraction
//!
//! The orchestrator talks to the cache through [`CacheStore`] only. Entries
//! are JSON values so one store serves both the search and autocomplete
//! namespaces. Entries leave the cache in exactly two ways: TTL expiry or
//! prefix deletion. There is no per-entry update path.

pub mod memory;
pub mod redis;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::Result;

pub use self::memory::InMemoryCacheStore;
pub use self::redis::RedisCacheStore;

#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch an entry; `Ok(None)` on miss or expiry, `Err` only when the
    /// store itself is unreachable.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Store an entry with a fixed time-to-live.
    async fn set(&self, key: &str, value: &Value, ttl: Duration) -> Result<()>;

    /// Remove every entry whose key starts with `prefix`; returns the number
    /// of entries removed.
    async fn delete_by_prefix(&self, prefix: &str) -> Result<u64>;
}
