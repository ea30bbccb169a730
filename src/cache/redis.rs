//! Redis-backed cache store
//!
//! Payloads are stored as JSON strings under TTL'd keys. Prefix deletion
//! uses server-side `SCAN MATCH` with batched `UNLINK`, never a client-side
//! enumeration of individual entries. Every redis failure surfaces as
//! [`crate::Error::CacheUnavailable`]; whether to degrade or fail on that is
//! the caller's call, not this wrapper's.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde_json::Value;

use super::CacheStore;
use crate::{Error, Result};

const SCAN_BATCH: usize = 200;

#[derive(Clone)]
pub struct RedisCacheStore {
    conn: ConnectionManager,
}

impl RedisCacheStore {
    /// Connect to redis at `url` (e.g. `redis://127.0.0.1/`). The
    /// ConnectionManager reconnects on its own after transient drops.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| Error::Config(format!("invalid redis url: {e}")))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| Error::CacheUnavailable(e.to_string()))?;
        tracing::info!(url = %url, "connected to redis cache");
        Ok(Self { conn })
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| Error::CacheUnavailable(e.to_string()))?;
        match raw {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &Value, ttl: Duration) -> Result<()> {
        let payload = serde_json::to_string(value)?;
        let mut conn = self.conn.clone();
        // Sub-second TTLs round up; a zero TTL would mean "no expiry" to redis.
        let seconds = ttl.as_secs().max(1);
        let _: () = conn
            .set_ex(key, payload, seconds)
            .await
            .map_err(|e| Error::CacheUnavailable(e.to_string()))?;
        Ok(())
    }

    async fn delete_by_prefix(&self, prefix: &str) -> Result<u64> {
        let pattern = format!("{prefix}*");
        let mut conn = self.conn.clone();
        let mut cursor: u64 = 0;
        let mut removed: u64 = 0;

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await
                .map_err(|e| Error::CacheUnavailable(e.to_string()))?;

            if !keys.is_empty() {
                let deleted: u64 = conn
                    .unlink(&keys)
                    .await
                    .map_err(|e| Error::CacheUnavailable(e.to_string()))?;
                removed += deleted;
            }

            cursor = next;
            if cursor == 0 {
                break;
            }
        }

        tracing::debug!(prefix = %prefix, removed, "deleted cache entries by prefix");
        Ok(removed)
    }
}
