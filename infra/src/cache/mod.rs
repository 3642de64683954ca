//! Cache module for the OTP store
//!
//! This module provides the store backends behind the core `KeyValueStore`
//! trait: Redis for any shared deployment and an in-memory map for local
//! development.

pub mod memory_store;
pub mod redis_client;
pub mod redis_store;

#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use otp_core::services::KeyValueStore;
use otp_shared::config::{Environment, StoreBackend, StoreConfig};

use crate::InfrastructureError;

pub use memory_store::InMemoryStore;
pub use redis_client::RedisClient;
pub use redis_store::RedisStore;

// Re-export commonly used types
pub use otp_shared::config::CacheConfig;

/// Create the OTP store selected by configuration
///
/// The in-memory backend is refused in production. A Redis backend that
/// cannot be reached is an error; there is no fallback.
///
/// # Arguments
///
/// * `config` - Store configuration
/// * `environment` - Deployment environment
pub async fn create_store(
    config: &StoreConfig,
    environment: Environment,
) -> Result<Arc<dyn KeyValueStore>, InfrastructureError> {
    match config.backend {
        StoreBackend::Redis => {
            let client = RedisClient::new(&config.redis).await?;
            info!(backend = "redis", "OTP store ready");
            Ok(Arc::new(RedisStore::new(client)))
        }
        StoreBackend::Memory if environment.is_production() => Err(InfrastructureError::Config(
            "In-memory OTP store cannot be used in production".to_string(),
        )),
        StoreBackend::Memory => {
            let store = InMemoryStore::new();
            if config.sweep_interval_seconds > 0 {
                store.spawn_sweeper(Duration::from_secs(config.sweep_interval_seconds));
            }
            info!(backend = "memory", environment = %environment, "OTP store ready");
            Ok(Arc::new(store))
        }
    }
}
