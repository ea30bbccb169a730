//! Ingest-triggered cache invalidation
//!
//! The write path calls [`CacheInvalidator::invalidate_all`] after bulk
//! ingestion. Invalidation is coarse: every `search:` entry goes, regardless
//! of whether the new documents would have matched it. Between ingests the
//! TTL bounds staleness on its own. The `autocomplete:` namespace is left
//! alone; suggestions tolerate a longer staleness window.

use std::sync::Arc;

use crate::cache::CacheStore;
use crate::search::SEARCH_KEY_PREFIX;
use crate::Result;

pub struct CacheInvalidator {
    cache: Arc<dyn CacheStore>,
}

impl CacheInvalidator {
    pub fn new(cache: Arc<dyn CacheStore>) -> Self {
        Self { cache }
    }

    /// Drop every cached search result. Returns the number of entries
    /// removed.
    pub async fn invalidate_all(&self) -> Result<u64> {
        let removed = self.cache.delete_by_prefix(SEARCH_KEY_PREFIX).await?;
        tracing::info!(removed, "invalidated search result cache");
        Ok(removed)
    }
}
