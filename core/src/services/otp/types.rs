//! Types for OTP lifecycle results

use serde::Serialize;
use std::fmt;

use crate::domain::entities::OtpEntry;

/// Freshly issued (or reissued) entry together with its plaintext code
///
/// The plaintext is handed out exactly once so the caller can deliver it.
/// It is redacted from `Debug` output.
#[derive(Clone)]
pub struct IssuedCode {
    /// The entry as stored, or as it will be stored once a reissue is committed
    pub entry: OtpEntry,
    code: String,
    /// Hash this code replaces, set for a pending reissue
    replaces: Option<String>,
}

impl IssuedCode {
    pub(crate) fn new(entry: OtpEntry, code: String) -> Self {
        Self {
            entry,
            code,
            replaces: None,
        }
    }

    pub(crate) fn replacing(entry: OtpEntry, code: String, previous_hash: String) -> Self {
        Self {
            entry,
            code,
            replaces: Some(previous_hash),
        }
    }

    /// The plaintext code to deliver
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Whether this is a reissue that has not been committed to the store
    pub fn is_pending(&self) -> bool {
        self.replaces.is_some()
    }

    pub(crate) fn replaces(&self) -> Option<&str> {
        self.replaces.as_deref()
    }
}

impl fmt::Debug for IssuedCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedCode")
            .field("entry", &self.entry)
            .field("code", &"[REDACTED]")
            .finish()
    }
}

/// Whether a code may be delivered to a subject right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DeliveryCheck {
    /// Delivery permitted
    Allowed,
    /// Previous delivery too recent
    Cooldown {
        /// Milliseconds until the cooldown ends
        retry_after_ms: u64,
    },
    /// Resend cap reached for the live entry
    Limit,
}

impl DeliveryCheck {
    /// Whether delivery is permitted
    pub fn is_allowed(&self) -> bool {
        matches!(self, DeliveryCheck::Allowed)
    }

    /// Machine-readable denial reason
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            DeliveryCheck::Allowed => None,
            DeliveryCheck::Cooldown { .. } => Some("cooldown"),
            DeliveryCheck::Limit => Some("limit"),
        }
    }
}

/// Why a verification was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyFailure {
    /// No live entry for the subject
    Expired,
    /// Attempt cap exceeded; the entry has been deleted
    TooManyAttempts,
    /// Candidate did not match; the entry is kept
    InvalidCode,
}

impl VerifyFailure {
    /// Machine-readable reason
    pub fn as_str(&self) -> &'static str {
        match self {
            VerifyFailure::Expired => "expired",
            VerifyFailure::TooManyAttempts => "too_many_attempts",
            VerifyFailure::InvalidCode => "invalid_code",
        }
    }
}

impl fmt::Display for VerifyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of verifying a candidate code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Candidate matched; the entry is left in place for the caller to revoke
    Verified,
    /// Candidate rejected
    Rejected(VerifyFailure),
}

impl VerifyOutcome {
    /// Whether the candidate matched
    pub fn is_verified(&self) -> bool {
        matches!(self, VerifyOutcome::Verified)
    }

    /// Rejection reason, if any
    pub fn failure(&self) -> Option<VerifyFailure> {
        match self {
            VerifyOutcome::Verified => None,
            VerifyOutcome::Rejected(reason) => Some(*reason),
        }
    }
}
