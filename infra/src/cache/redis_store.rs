//! Redis-backed OTP store
//!
//! Adapts [`RedisClient`] to the core [`KeyValueStore`] trait. Every failure
//! surfaces as a store error; there is no fallback to another backend.

use async_trait::async_trait;
use std::time::Duration;

use otp_core::errors::{DomainError, DomainResult};
use otp_core::services::KeyValueStore;

use crate::cache::RedisClient;
use crate::InfrastructureError;

/// OTP store over a shared Redis instance
#[derive(Clone)]
pub struct RedisStore {
    client: RedisClient,
}

impl RedisStore {
    /// Wrap a connected client
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    /// Underlying client
    pub fn client(&self) -> &RedisClient {
        &self.client
    }

    /// Ping the server
    pub async fn health_check(&self) -> DomainResult<bool> {
        self.client.health_check().await.map_err(store_error)
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> DomainResult<Option<Vec<u8>>> {
        self.client.get(key).await.map_err(store_error)
    }

    async fn set_with_expiry(&self, key: &str, value: &[u8], ttl: Duration) -> DomainResult<()> {
        self.client
            .set_with_expiry(key, value, ttl)
            .await
            .map_err(store_error)
    }

    async fn delete(&self, key: &str) -> DomainResult<()> {
        self.client.delete(key).await.map_err(store_error)?;
        Ok(())
    }

    async fn remaining_ttl(&self, key: &str) -> DomainResult<Option<Duration>> {
        self.client.ttl(key).await.map_err(store_error)
    }
}

fn store_error(error: InfrastructureError) -> DomainError {
    DomainError::store(error.to_string())
}
