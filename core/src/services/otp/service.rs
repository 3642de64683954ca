//! OTP lifecycle manager implementation

use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, info, warn};

use otp_shared::config::OtpConfig;
use otp_shared::utils::{mask_email, mask_subject};

use crate::domain::entities::{DecodedEntry, OtpEntry};
use crate::errors::{DomainError, DomainResult};

use super::clock::{Clock, SystemClock};
use super::hasher::CodeHasher;
use super::traits::KeyValueStore;
use super::types::{DeliveryCheck, IssuedCode, VerifyFailure, VerifyOutcome};

/// Owns every mutation of OTP entries in the shared store
///
/// Every call reads from and writes to the store; nothing is cached between
/// calls, so any number of instances can share one store.
pub struct OtpLifecycleManager<S: KeyValueStore + ?Sized> {
    /// Store holding the entries
    store: Arc<S>,
    /// Lifecycle policy
    config: OtpConfig,
    /// Code hashing
    hasher: CodeHasher,
    /// Time source
    clock: Arc<dyn Clock>,
    /// Validity window
    ttl: Duration,
    /// Minimum spacing between deliveries
    cooldown: Duration,
}

impl<S: KeyValueStore + ?Sized> OtpLifecycleManager<S> {
    /// Create a manager reading the system clock
    ///
    /// # Arguments
    ///
    /// * `store` - Store implementation
    /// * `config` - Lifecycle policy, validated here
    pub fn new(store: Arc<S>, config: OtpConfig) -> DomainResult<Self> {
        Self::with_clock(store, config, Arc::new(SystemClock))
    }

    /// Create a manager with an explicit time source
    pub fn with_clock(store: Arc<S>, config: OtpConfig, clock: Arc<dyn Clock>) -> DomainResult<Self> {
        config
            .validate()
            .map_err(|message| DomainError::Configuration { message })?;

        let ttl = to_chrono(config.ttl())?;
        let cooldown = to_chrono(config.resend_cooldown())?;

        Ok(Self {
            store,
            hasher: CodeHasher::new(config.hash_cost),
            config,
            clock,
            ttl,
            cooldown,
        })
    }

    /// Lifecycle policy in effect
    pub fn config(&self) -> &OtpConfig {
        &self.config
    }

    /// Issue a new code, replacing any existing entry for the subject
    ///
    /// The returned [`IssuedCode`] carries the plaintext exactly once; the
    /// caller delivers it immediately and drops it.
    pub async fn issue(&self, subject_id: &str, email: &str) -> DomainResult<IssuedCode> {
        let key = self.entry_key(subject_id);

        let code = CodeHasher::generate_code(self.config.code_length);
        let code_hash = self.hasher.hash(&code).await?;

        let entry = OtpEntry::new(email.to_string(), code_hash, self.clock.now(), self.ttl);
        self.write(&key, &entry, self.config.ttl()).await?;

        info!(
            subject = %mask_subject(subject_id),
            email = %mask_email(email),
            expires_at = %entry.expires_at,
            event = "otp_issued",
            "Issued password reset code"
        );

        Ok(IssuedCode::new(entry, code))
    }

    /// Read the live entry for a subject
    ///
    /// Expired and malformed values are deleted and reported as absent.
    pub async fn fetch(&self, subject_id: &str) -> DomainResult<Option<OtpEntry>> {
        let key = self.entry_key(subject_id);

        let raw = match self.store.get(&key).await? {
            Some(raw) => raw,
            None => return Ok(None),
        };

        match OtpEntry::decode(&raw) {
            DecodedEntry::Valid(entry) if entry.is_expired_at(self.clock.now()) => {
                self.store.delete(&key).await?;
                debug!(
                    subject = %mask_subject(subject_id),
                    expires_at = %entry.expires_at,
                    event = "otp_expired_purged",
                    "Purged expired entry still held by the store"
                );
                Ok(None)
            }
            DecodedEntry::Valid(entry) => Ok(Some(entry)),
            DecodedEntry::Malformed(reason) => {
                self.store.delete(&key).await?;
                warn!(
                    subject = %mask_subject(subject_id),
                    reason = %reason,
                    event = "otp_malformed_purged",
                    "Purged malformed entry"
                );
                Ok(None)
            }
        }
    }

    /// Decide whether a code may be delivered now
    ///
    /// Cooldown is checked before the resend cap.
    pub async fn can_deliver(&self, subject_id: &str) -> DomainResult<DeliveryCheck> {
        let entry = match self.fetch(subject_id).await? {
            Some(entry) => entry,
            None => return Ok(DeliveryCheck::Allowed),
        };

        if let Some(remaining) = entry.cooldown_remaining_at(self.clock.now(), self.cooldown) {
            return Ok(DeliveryCheck::Cooldown {
                retry_after_ms: ceil_millis(remaining),
            });
        }

        if entry.resend_count >= self.config.max_resends {
            return Ok(DeliveryCheck::Limit);
        }

        Ok(DeliveryCheck::Allowed)
    }

    /// Record a successful resend delivery
    ///
    /// Bumps `resend_count` and `last_sent_at` without touching expiry.
    /// A subject without a live entry is left alone.
    pub async fn mark_delivered(&self, subject_id: &str) -> DomainResult<()> {
        self.record_delivery(subject_id, None).await?;
        Ok(())
    }

    /// Count one verification attempt against an entry fetched just before
    ///
    /// This is a read-increment-write over single-key primitives; concurrent
    /// calls for one subject may undercount.
    pub async fn record_attempt(&self, subject_id: &str, entry: OtpEntry) -> DomainResult<OtpEntry> {
        let (entry, _) = self.increment_attempts(subject_id, entry).await?;
        Ok(entry)
    }

    /// Verify a candidate code
    ///
    /// Every call against a live entry counts as an attempt. Once attempts
    /// exceed the cap the entry is deleted. A match leaves the entry in place;
    /// the caller revokes it after the reset has been applied.
    pub async fn verify(&self, subject_id: &str, candidate: &str) -> DomainResult<VerifyOutcome> {
        let entry = match self.fetch(subject_id).await? {
            Some(entry) => entry,
            None => return Ok(VerifyOutcome::Rejected(VerifyFailure::Expired)),
        };

        let (entry, persisted) = self.increment_attempts(subject_id, entry).await?;
        if !persisted {
            return Ok(VerifyOutcome::Rejected(VerifyFailure::Expired));
        }

        if entry.attempts > self.config.max_verify_attempts {
            self.store.delete(&self.entry_key(subject_id)).await?;
            warn!(
                subject = %mask_subject(subject_id),
                attempts = entry.attempts,
                max_attempts = self.config.max_verify_attempts,
                event = "otp_attempts_exceeded",
                "Verification attempts exceeded, entry deleted"
            );
            return Ok(VerifyOutcome::Rejected(VerifyFailure::TooManyAttempts));
        }

        let matched = CodeHasher::is_well_formed(candidate, self.config.code_length)
            && self.hasher.verify(candidate, &entry.code_hash).await?;

        if matched {
            info!(
                subject = %mask_subject(subject_id),
                attempts = entry.attempts,
                event = "otp_verified",
                "Password reset code verified"
            );
            Ok(VerifyOutcome::Verified)
        } else {
            warn!(
                subject = %mask_subject(subject_id),
                attempts = entry.attempts,
                max_attempts = self.config.max_verify_attempts,
                event = "otp_invalid_code",
                "Invalid password reset code"
            );
            Ok(VerifyOutcome::Rejected(VerifyFailure::InvalidCode))
        }
    }

    /// Prepare a replacement code for the live entry
    ///
    /// Nothing is written: the code the subject already holds stays valid
    /// until the replacement has been delivered and passed to
    /// [`commit_reissue`](Self::commit_reissue). Email, issue time, expiry and
    /// counters are carried over. Returns `None` when there is no live entry.
    pub async fn reissue(&self, subject_id: &str) -> DomainResult<Option<IssuedCode>> {
        let mut entry = match self.fetch(subject_id).await? {
            Some(entry) => entry,
            None => return Ok(None),
        };

        let code = CodeHasher::generate_code(self.config.code_length);
        let code_hash = self.hasher.hash(&code).await?;
        let previous_hash = std::mem::replace(&mut entry.code_hash, code_hash);

        debug!(
            subject = %mask_subject(subject_id),
            resend_count = entry.resend_count,
            "Prepared replacement code"
        );

        Ok(Some(IssuedCode::replacing(entry, code, previous_hash)))
    }

    /// Store a delivered replacement code and record the resend
    ///
    /// Swaps in the new hash and applies the [`mark_delivered`](Self::mark_delivered)
    /// bookkeeping in a single write. Returns false, leaving the store as is,
    /// if the entry has expired or no longer holds the hash the replacement
    /// was prepared against.
    pub async fn commit_reissue(&self, subject_id: &str, reissued: &IssuedCode) -> DomainResult<bool> {
        if !reissued.is_pending() {
            return Err(DomainError::Internal {
                message: "commit_reissue called with a code that is not a pending reissue".to_string(),
            });
        }

        self.record_delivery(subject_id, Some(reissued)).await
    }

    /// Delete the entry for a subject; idempotent
    pub async fn revoke(&self, subject_id: &str) -> DomainResult<()> {
        self.store.delete(&self.entry_key(subject_id)).await?;

        info!(
            subject = %mask_subject(subject_id),
            event = "otp_revoked",
            "Revoked password reset code"
        );

        Ok(())
    }

    /// Store key for a subject
    fn entry_key(&self, subject_id: &str) -> String {
        format!("{}:{}", self.config.key_prefix, subject_id)
    }

    /// Resend bookkeeping, optionally rotating to a pending reissued code
    async fn record_delivery(&self, subject_id: &str, reissued: Option<&IssuedCode>) -> DomainResult<bool> {
        let key = self.entry_key(subject_id);

        let mut entry = match self.fetch(subject_id).await? {
            Some(entry) => entry,
            None => {
                debug!(
                    subject = %mask_subject(subject_id),
                    "No live entry to mark as delivered"
                );
                return Ok(false);
            }
        };

        if let Some(reissued) = reissued {
            if reissued.replaces() != Some(entry.code_hash.as_str()) {
                warn!(
                    subject = %mask_subject(subject_id),
                    event = "otp_reissue_stale",
                    "Entry changed while a replacement code was in flight, keeping the stored code"
                );
                return Ok(false);
            }
            entry.code_hash = reissued.entry.code_hash.clone();
        }

        entry.resend_count = entry.resend_count.saturating_add(1);
        entry.last_sent_at = self.clock.now();

        let persisted = self.persist_preserving_ttl(&key, &entry).await?;
        if persisted {
            let event = if reissued.is_some() { "otp_reissued" } else { "otp_delivered" };
            info!(
                subject = %mask_subject(subject_id),
                resend_count = entry.resend_count,
                expires_at = %entry.expires_at,
                event = event,
                "Recorded code resend"
            );
        }

        Ok(persisted)
    }

    /// Increment attempts and persist; the flag is false if the entry vanished
    async fn increment_attempts(&self, subject_id: &str, mut entry: OtpEntry) -> DomainResult<(OtpEntry, bool)> {
        entry.attempts = entry.attempts.saturating_add(1);

        let persisted = self
            .persist_preserving_ttl(&self.entry_key(subject_id), &entry)
            .await?;

        debug!(
            subject = %mask_subject(subject_id),
            attempts = entry.attempts,
            persisted = persisted,
            "Recorded verification attempt"
        );

        Ok((entry, persisted))
    }

    /// Write a mutated entry without extending its lifetime
    ///
    /// Uses the smaller of the store's remaining TTL and the entry's own
    /// remaining window. Returns false without writing if the key is gone or
    /// no time is left, so a concurrently deleted entry is never resurrected.
    async fn persist_preserving_ttl(&self, key: &str, entry: &OtpEntry) -> DomainResult<bool> {
        let store_ttl = match self.store.remaining_ttl(key).await? {
            Some(ttl) => ttl,
            None => {
                debug!("Entry disappeared before it could be updated");
                return Ok(false);
            }
        };

        let entry_ttl = entry
            .remaining_at(self.clock.now())
            .to_std()
            .unwrap_or(std::time::Duration::ZERO);
        let ttl = store_ttl.min(entry_ttl);

        if ttl.is_zero() {
            self.store.delete(key).await?;
            return Ok(false);
        }

        self.write(key, entry, ttl).await?;
        Ok(true)
    }

    /// Serialize and store an entry
    async fn write(&self, key: &str, entry: &OtpEntry, ttl: std::time::Duration) -> DomainResult<()> {
        let raw = entry.encode().map_err(|e| DomainError::Internal {
            message: format!("Failed to serialize OTP entry: {}", e),
        })?;

        self.store.set_with_expiry(key, &raw, ttl).await
    }
}

/// Convert a configured duration into a chrono duration
fn to_chrono(duration: std::time::Duration) -> DomainResult<Duration> {
    Duration::from_std(duration).map_err(|e| DomainError::Configuration {
        message: format!("duration out of range: {}", e),
    })
}

/// Whole milliseconds, rounded up so a running cooldown never reports zero
fn ceil_millis(duration: Duration) -> u64 {
    let millis = duration.num_milliseconds();
    let rounded = if duration > Duration::milliseconds(millis) {
        millis + 1
    } else {
        millis
    };
    rounded.max(0) as u64
}
