//! Unit tests for store selection

use std::time::Duration;

use crate::cache::create_store;
use otp_core::services::KeyValueStore;
use crate::InfrastructureError;
use otp_shared::config::{CacheConfig, Environment, StoreConfig};

#[tokio::test]
async fn test_memory_store_in_development() {
    let store = create_store(&StoreConfig::memory(), Environment::Development)
        .await
        .unwrap();

    store.set_with_expiry("k", b"v", Duration::from_secs(5)).await.unwrap();
    assert_eq!(store.get("k").await.unwrap(), Some(b"v".to_vec()));
}

#[tokio::test]
async fn test_memory_store_refused_in_production() {
    let result = create_store(&StoreConfig::memory(), Environment::Production).await;

    match result {
        Err(InfrastructureError::Config(message)) => assert!(message.contains("production")),
        _ => panic!("Expected configuration error"),
    }
}

#[tokio::test]
async fn test_unreachable_redis_is_an_error() {
    let mut redis = CacheConfig::new("redis://127.0.0.1:1");
    redis.max_retries = 1;

    let result = create_store(&StoreConfig::redis(redis), Environment::Development).await;
    assert!(matches!(result, Err(InfrastructureError::Cache(_))));
}
