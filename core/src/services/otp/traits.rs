//! Store abstraction consumed by the lifecycle manager

use async_trait::async_trait;
use std::time::Duration;

use crate::errors::DomainResult;

/// Expiring key-value store with single-key atomic primitives
///
/// There are no multi-key transactions and no atomic read-modify-write.
/// Implementations must surface connectivity problems as errors and never
/// degrade to a different backend on their own.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` if the key is absent or has expired
    async fn get(&self, key: &str) -> DomainResult<Option<Vec<u8>>>;

    /// Write a value that expires after `ttl`
    async fn set_with_expiry(&self, key: &str, value: &[u8], ttl: Duration) -> DomainResult<()>;

    /// Delete a key; deleting a missing key is not an error
    async fn delete(&self, key: &str) -> DomainResult<()>;

    /// Time left before the key expires, `None` if the key is absent
    async fn remaining_ttl(&self, key: &str) -> DomainResult<Option<Duration>>;
}
