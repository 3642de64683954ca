//! Store backend configuration module

use serde::{Deserialize, Serialize};

/// Redis cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Redis connection URL
    #[serde(default = "default_url")]
    pub url: String,

    /// Maximum attempts for a single Redis operation
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between retries in milliseconds (doubled per attempt)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Redis database number (0-15)
    #[serde(default)]
    pub database: u8,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            database: 0,
        }
    }
}

impl CacheConfig {
    /// Create a new cache configuration with URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the database number
    pub fn with_database(mut self, db: u8) -> Self {
        self.database = db.min(15);
        self
    }

    /// Connection URL with the database number applied
    pub fn connection_url(&self) -> String {
        if self.database == 0 {
            return self.url.clone();
        }
        format!("{}/{}", self.url.trim_end_matches('/'), self.database)
    }
}

/// Store backend enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Shared Redis instance (production)
    Redis,
    /// Single-process map (local development only)
    Memory,
}

/// OTP store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Backend selection
    #[serde(default = "default_backend")]
    pub backend: StoreBackend,

    /// Redis settings, used when `backend` is `redis`
    #[serde(default)]
    pub redis: CacheConfig,

    /// Sweep interval for the in-memory backend in seconds (0 disables the sweeper)
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            redis: CacheConfig::default(),
            sweep_interval_seconds: default_sweep_interval(),
        }
    }
}

impl StoreConfig {
    /// Redis-backed store
    pub fn redis(redis: CacheConfig) -> Self {
        Self {
            backend: StoreBackend::Redis,
            redis,
            ..Default::default()
        }
    }

    /// In-memory store for local development
    pub fn memory() -> Self {
        Self {
            backend: StoreBackend::Memory,
            ..Default::default()
        }
    }
}

fn default_url() -> String {
    String::from("redis://localhost:6379")
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    100
}

fn default_backend() -> StoreBackend {
    StoreBackend::Redis
}

fn default_sweep_interval() -> u64 {
    60 // 1 minute
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.url, "redis://localhost:6379");
        assert_eq!(config.database, 0);
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_connection_url_with_database() {
        let config = CacheConfig::new("redis://cache:6379/").with_database(2);
        assert_eq!(config.connection_url(), "redis://cache:6379/2");

        let config = CacheConfig::new("redis://cache:6379").with_database(42);
        assert_eq!(config.database, 15);
    }

    #[test]
    fn test_store_backend_deserialize() {
        let config: StoreConfig = serde_json::from_str(r#"{ "backend": "memory" }"#).unwrap();
        assert_eq!(config.backend, StoreBackend::Memory);
        assert_eq!(config.sweep_interval_seconds, 60);
    }

    #[test]
    fn test_store_default_is_redis() {
        assert_eq!(StoreConfig::default().backend, StoreBackend::Redis);
    }
}
