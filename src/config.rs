//! Layered configuration
//!
//! Precedence, lowest to highest: built-in defaults, `config/default.toml`,
//! `config/local.toml`, environment variables prefixed `LOGWARD_` (nested
//! keys separated by `__`, e.g. `LOGWARD_REDIS__URL`). A `.env` file is
//! loaded first when present.

use serde::Deserialize;

use crate::{Error, Result};

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub elasticsearch: ElasticsearchConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ElasticsearchConfig {
    #[serde(default = "default_es_url")]
    pub url: String,
    #[serde(default = "default_es_index")]
    pub index: String,
    #[serde(default = "default_es_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    #[serde(default = "default_redis_url")]
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// TTL for cached search results. Kept short; the only bound on
    /// staleness between ingests.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_seconds: u64,
    /// TTL for cached autocomplete suggestions.
    #[serde(default = "default_suggest_ttl")]
    pub suggest_ttl_seconds: u64,
    /// Prefixes shorter than this return no suggestions.
    #[serde(default = "default_suggest_min_chars")]
    pub suggest_min_chars: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of the human-readable format.
    #[serde(default)]
    pub json: bool,
    /// When set, also write daily-rotated log files to this directory.
    #[serde(default)]
    pub file_directory: Option<String>,
    #[serde(default = "default_log_file_prefix")]
    pub file_prefix: String,
}

impl Config {
    /// Load configuration from files and environment.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let settings = ::config::Config::builder()
            .add_source(::config::File::with_name("config/default").required(false))
            .add_source(::config::File::with_name("config/local").required(false))
            .add_source(
                ::config::Environment::with_prefix("LOGWARD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        settings
            .try_deserialize()
            .map_err(|e| Error::Config(e.to_string()))
    }
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            url: default_es_url(),
            index: default_es_index(),
            timeout_seconds: default_es_timeout(),
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            cache_ttl_seconds: default_cache_ttl(),
            suggest_ttl_seconds: default_suggest_ttl(),
            suggest_min_chars: default_suggest_min_chars(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            file_directory: None,
            file_prefix: default_log_file_prefix(),
        }
    }
}

fn default_es_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_es_index() -> String {
    "logs".to_string()
}

fn default_es_timeout() -> u64 {
    10
}

fn default_redis_url() -> String {
    "redis://127.0.0.1/".to_string()
}

fn default_cache_ttl() -> u64 {
    30
}

fn default_suggest_ttl() -> u64 {
    3600
}

fn default_suggest_min_chars() -> usize {
    2
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file_prefix() -> String {
    "logward".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.search.cache_ttl_seconds, 30);
        assert_eq!(config.search.suggest_min_chars, 2);
        assert_eq!(config.elasticsearch.index, "logs");
        assert!(config.search.suggest_ttl_seconds > config.search.cache_ttl_seconds);
    }
}
