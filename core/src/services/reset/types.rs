//! Types for reset flow results

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::services::otp::{DeliveryCheck, VerifyFailure};

/// Result of asking for a reset code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CodeRequestOutcome {
    /// A new code was issued and mailed
    Sent {
        /// When the code stops being accepted
        expires_at: DateTime<Utc>,
    },
    /// The live entry received a fresh code
    Resent {
        /// Resends recorded against the entry so far
        resend_count: u32,
    },
    /// Delivery refused by the cooldown or the resend cap
    Denied {
        /// The refusing check
        check: DeliveryCheck,
    },
    /// No account for the subject
    UnknownSubject,
}

/// Result of confirming a reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum ResetOutcome {
    /// Password replaced and the code consumed
    Completed,
    /// Code rejected; nothing changed
    Rejected(VerifyFailure),
}

impl ResetOutcome {
    /// Whether the reset was applied
    pub fn is_completed(&self) -> bool {
        matches!(self, ResetOutcome::Completed)
    }
}
