//! In-memory OTP store for development
//!
//! A single-process map guarded by an async `RwLock`. Expiry is checked on
//! every read; [`InMemoryStore::purge_expired`] drops stale keys and
//! [`InMemoryStore::spawn_sweeper`] runs it periodically. Entries are not
//! shared across processes, so this backend is refused in production.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use otp_core::errors::{DomainError, DomainResult};
use otp_core::services::{Clock, KeyValueStore, SystemClock};

#[derive(Debug, Clone)]
struct StoredValue {
    value: Vec<u8>,
    expires_at: DateTime<Utc>,
}

impl StoredValue {
    fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Expiring map held in process memory
#[derive(Clone)]
pub struct InMemoryStore {
    entries: Arc<RwLock<HashMap<String, StoredValue>>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryStore {
    /// Create a store reading the system clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a store with an explicit time source
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        warn!("Using in-memory OTP store; entries are lost on restart and not shared between processes");

        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }

    /// Remove every expired key
    ///
    /// # Returns
    /// * Number of keys removed
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;

        let before = entries.len();
        entries.retain(|_, stored| stored.is_live_at(now));
        let removed = before - entries.len();

        if removed > 0 {
            debug!(removed = removed, "Purged expired in-memory entries");
        }
        removed
    }

    /// Number of keys currently held, expired or not
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the map holds no keys
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Run [`purge_expired`](Self::purge_expired) every `interval`
    ///
    /// The task runs until the returned handle is aborted.
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let store = self.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                store.purge_expired().await;
            }
        })
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> DomainResult<Option<Vec<u8>>> {
        let now = self.clock.now();
        let entries = self.entries.read().await;

        Ok(entries
            .get(key)
            .filter(|stored| stored.is_live_at(now))
            .map(|stored| stored.value.clone()))
    }

    async fn set_with_expiry(&self, key: &str, value: &[u8], ttl: Duration) -> DomainResult<()> {
        let ttl = chrono::Duration::from_std(ttl).map_err(|e| DomainError::Store {
            message: format!("TTL out of range: {}", e),
        })?;

        let stored = StoredValue {
            value: value.to_vec(),
            expires_at: self.clock.now() + ttl,
        };
        self.entries.write().await.insert(key.to_string(), stored);

        Ok(())
    }

    async fn delete(&self, key: &str) -> DomainResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn remaining_ttl(&self, key: &str) -> DomainResult<Option<Duration>> {
        let now = self.clock.now();
        let entries = self.entries.read().await;

        Ok(entries
            .get(key)
            .filter(|stored| stored.is_live_at(now))
            .and_then(|stored| (stored.expires_at - now).to_std().ok()))
    }
}
