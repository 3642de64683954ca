//! Redis client implementation
//!
//! This module provides a Redis client with a multiplexed connection, retry
//! logic, and the single-key commands the OTP store needs: set with a
//! millisecond expiry, get, delete and remaining TTL.

use redis::{aio::MultiplexedConnection, Client, RedisError, RedisResult};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use otp_shared::config::CacheConfig;
use otp_shared::utils::mask_subject;

use crate::InfrastructureError;

/// Upper bound for the exponential backoff between retries
const MAX_RETRY_DELAY_MS: u64 = 5000;

/// Redis client with connection reuse and retry logic
///
/// Cloning is cheap; all clones share the multiplexed connection.
#[derive(Clone)]
pub struct RedisClient {
    /// Redis multiplexed connection for async operations
    connection: MultiplexedConnection,
    /// Maximum number of attempts per operation
    max_retries: u32,
    /// Base delay between retries (exponential backoff)
    retry_delay_ms: u64,
}

impl RedisClient {
    /// Connect using the retry settings from the configuration
    ///
    /// # Arguments
    /// * `config` - Cache configuration settings
    ///
    /// # Example
    /// ```no_run
    /// use otp_infra::cache::RedisClient;
    /// use otp_shared::config::CacheConfig;
    ///
    /// async fn create_client() -> Result<RedisClient, Box<dyn std::error::Error>> {
    ///     let client = RedisClient::new(&CacheConfig::new("redis://localhost:6379")).await?;
    ///     Ok(client)
    /// }
    /// ```
    pub async fn new(config: &CacheConfig) -> Result<Self, InfrastructureError> {
        let url = config.connection_url();
        info!("Creating Redis client with URL: {}", mask_url(&url));

        let client = Client::open(url.as_str()).map_err(|e| {
            error!("Failed to parse Redis URL: {}", e);
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let max_retries = config.max_retries.max(1);
        let connection =
            Self::create_connection_with_retry(client, max_retries, config.retry_delay_ms).await?;

        info!("Redis client created successfully");

        Ok(Self {
            connection,
            max_retries,
            retry_delay_ms: config.retry_delay_ms,
        })
    }

    /// Create multiplexed connection with retry logic
    async fn create_connection_with_retry(
        client: Client,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let mut attempts = 0;
        let mut delay = retry_delay_ms;

        loop {
            attempts += 1;
            debug!("Attempting to connect to Redis (attempt {})", attempts);

            match client.get_multiplexed_async_connection().await {
                Ok(connection) => {
                    info!("Successfully connected to Redis");
                    return Ok(connection);
                }
                Err(e) if attempts < max_retries => {
                    warn!(
                        "Failed to connect to Redis (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, max_retries, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(MAX_RETRY_DELAY_MS);
                }
                Err(e) => {
                    error!("Failed to connect to Redis after {} attempts: {}", attempts, e);
                    return Err(InfrastructureError::Cache(e));
                }
            }
        }
    }

    /// Set a value that expires after `ttl` (`SET key value PX ms`)
    ///
    /// Sub-millisecond TTLs are rounded up to one millisecond.
    pub async fn set_with_expiry(
        &self,
        key: &str,
        value: &[u8],
        ttl: Duration,
    ) -> Result<(), InfrastructureError> {
        let ttl_ms = ttl_millis(ttl);
        debug!("Setting key '{}' with expiry {}ms", mask_key(key), ttl_ms);

        self.execute_with_retry(|mut conn| {
            let key = key.to_string();
            let value = value.to_vec();

            Box::pin(async move {
                redis::cmd("SET")
                    .arg(key)
                    .arg(value)
                    .arg("PX")
                    .arg(ttl_ms)
                    .query_async::<_, ()>(&mut conn)
                    .await
            })
        })
        .await
        .map_err(|e| {
            error!("Failed to set key '{}': {}", mask_key(key), e);
            InfrastructureError::Cache(e)
        })
    }

    /// Get a raw value, `None` if the key is absent
    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, InfrastructureError> {
        debug!("Getting key '{}'", mask_key(key));

        let value = self
            .execute_with_retry(|mut conn| {
                let key = key.to_string();

                Box::pin(async move {
                    redis::cmd("GET")
                        .arg(key)
                        .query_async::<_, Option<Vec<u8>>>(&mut conn)
                        .await
                })
            })
            .await
            .map_err(|e| {
                error!("Failed to get key '{}': {}", mask_key(key), e);
                InfrastructureError::Cache(e)
            })?;

        if value.is_none() {
            debug!("Key '{}' not found", mask_key(key));
        }
        Ok(value)
    }

    /// Delete a key
    ///
    /// # Returns
    /// * `true` if the key existed
    pub async fn delete(&self, key: &str) -> Result<bool, InfrastructureError> {
        debug!("Deleting key '{}'", mask_key(key));

        let deleted = self
            .execute_with_retry(|mut conn| {
                let key = key.to_string();

                Box::pin(async move { redis::cmd("DEL").arg(key).query_async::<_, u32>(&mut conn).await })
            })
            .await
            .map_err(|e| {
                error!("Failed to delete key '{}': {}", mask_key(key), e);
                InfrastructureError::Cache(e)
            })?;

        Ok(deleted > 0)
    }

    /// Remaining time to live (`PTTL`)
    ///
    /// # Returns
    /// * `Ok(Some(ttl))` for a key with an expiry
    /// * `Ok(None)` if the key does not exist or never expires
    pub async fn ttl(&self, key: &str) -> Result<Option<Duration>, InfrastructureError> {
        debug!("Getting TTL for key '{}'", mask_key(key));

        let pttl = self
            .execute_with_retry(|mut conn| {
                let key = key.to_string();

                Box::pin(async move { redis::cmd("PTTL").arg(key).query_async::<_, i64>(&mut conn).await })
            })
            .await
            .map_err(|e| {
                error!("Failed to get TTL for key '{}': {}", mask_key(key), e);
                InfrastructureError::Cache(e)
            })?;

        Ok(pttl_to_duration(pttl))
    }

    /// Check if the Redis connection is healthy
    ///
    /// Performs a PING command to verify connectivity.
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        debug!("Performing Redis health check");

        let result = self
            .execute_with_retry(|mut conn| {
                Box::pin(async move { redis::cmd("PING").query_async::<_, String>(&mut conn).await })
            })
            .await;

        match result {
            Ok(response) if response == "PONG" => {
                debug!("Redis health check passed");
                Ok(true)
            }
            Ok(response) => {
                warn!("Redis health check returned unexpected response: {}", response);
                Ok(false)
            }
            Err(e) => {
                error!("Redis health check failed: {}", e);
                Err(InfrastructureError::Cache(e))
            }
        }
    }

    /// Execute a Redis operation with automatic retry logic
    ///
    /// Only transient errors are retried, with exponential backoff.
    async fn execute_with_retry<F, T>(&self, operation: F) -> RedisResult<T>
    where
        F: Fn(MultiplexedConnection) -> std::pin::Pin<Box<dyn std::future::Future<Output = RedisResult<T>> + Send>>,
    {
        let mut attempts = 0;
        let mut delay = self.retry_delay_ms;

        loop {
            attempts += 1;
            let conn = self.connection.clone();

            match operation(conn).await {
                Ok(result) => return Ok(result),
                Err(e) if attempts < self.max_retries && is_retriable_error(&e) => {
                    warn!(
                        "Redis operation failed (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, self.max_retries, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(MAX_RETRY_DELAY_MS);
                }
                Err(e) => {
                    error!("Redis operation failed after {} attempts: {}", attempts, e);
                    return Err(e);
                }
            }
        }
    }
}

/// Check if a Redis error is transient and the operation should be retried
pub(crate) fn is_retriable_error(error: &RedisError) -> bool {
    matches!(
        error.kind(),
        redis::ErrorKind::IoError
            | redis::ErrorKind::ClientError
            | redis::ErrorKind::BusyLoadingError
            | redis::ErrorKind::TryAgain
    )
}

/// Mask a store key for logging; keys embed the subject identifier
pub(crate) fn mask_key(key: &str) -> String {
    mask_subject(key)
}

/// Mask credentials in a Redis URL for logging
pub(crate) fn mask_url(url: &str) -> String {
    if let Some(at_pos) = url.rfind('@') {
        if let Some(proto_end) = url.find("://") {
            let proto = &url[..proto_end + 3];
            let host_part = &url[at_pos..];
            return format!("{}****{}", proto, host_part);
        }
    }
    url.to_string()
}

/// Milliseconds for `PX`, never zero
pub(crate) fn ttl_millis(ttl: Duration) -> u64 {
    let millis = ttl.as_millis().min(u64::MAX as u128) as u64;
    if Duration::from_millis(millis) < ttl {
        millis + 1
    } else {
        millis.max(1)
    }
}

/// Interpret a `PTTL` reply (-2 missing key, -1 no expiry)
pub(crate) fn pttl_to_duration(pttl: i64) -> Option<Duration> {
    if pttl >= 0 {
        Some(Duration::from_millis(pttl as u64))
    } else {
        None
    }
}
