//! Mock store for testing the lifecycle manager

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::errors::{DomainError, DomainResult};
use crate::services::otp::{Clock, KeyValueStore, ManualClock};

// Expiring map driven by the shared manual clock
pub struct MockStore {
    pub entries: Arc<Mutex<HashMap<String, (Vec<u8>, DateTime<Utc>)>>>,
    pub clock: Arc<ManualClock>,
    pub should_fail: AtomicBool,
    // Simulates the key being deleted between a read and the TTL lookup
    pub lose_ttl: AtomicBool,
}

impl MockStore {
    pub fn new(clock: Arc<ManualClock>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            clock,
            should_fail: AtomicBool::new(false),
            lose_ttl: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.should_fail.store(failing, Ordering::SeqCst);
    }

    pub fn set_lose_ttl(&self, lose: bool) {
        self.lose_ttl.store(lose, Ordering::SeqCst);
    }

    pub fn put_raw(&self, key: &str, value: &[u8], ttl: ChronoDuration) {
        let expires = self.clock.now() + ttl;
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_vec(), expires));
    }

    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        let now = self.clock.now();
        self.entries
            .lock()
            .unwrap()
            .get(key)
            .filter(|(_, expires)| *expires > now)
            .map(|(value, _)| value.clone())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }

    pub fn store_expiry(&self, key: &str) -> Option<DateTime<Utc>> {
        self.entries.lock().unwrap().get(key).map(|(_, expires)| *expires)
    }

    fn check(&self) -> DomainResult<()> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(DomainError::store("connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for MockStore {
    async fn get(&self, key: &str) -> DomainResult<Option<Vec<u8>>> {
        self.check()?;
        Ok(self.raw(key))
    }

    async fn set_with_expiry(&self, key: &str, value: &[u8], ttl: Duration) -> DomainResult<()> {
        self.check()?;
        self.put_raw(key, value, ChronoDuration::from_std(ttl).unwrap());
        Ok(())
    }

    async fn delete(&self, key: &str) -> DomainResult<()> {
        self.check()?;
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    async fn remaining_ttl(&self, key: &str) -> DomainResult<Option<Duration>> {
        self.check()?;
        if self.lose_ttl.load(Ordering::SeqCst) {
            return Ok(None);
        }

        let now = self.clock.now();
        Ok(self
            .entries
            .lock()
            .unwrap()
            .get(key)
            .filter(|(_, expires)| *expires > now)
            .map(|(_, expires)| (*expires - now).to_std().unwrap()))
    }
}
