//! OTP lifecycle module for the password-reset flow
//!
//! This module owns every mutation of an OTP entry:
//! - Issuing a code (generate, hash, persist with TTL)
//! - Reading entries with expiry re-check and self-healing of malformed data
//! - Resend throttling (cooldown and per-entry resend cap)
//! - Verification with a bounded number of attempts
//! - Revocation
//!
//! Entries live in an external expiring key-value store reached through the
//! [`KeyValueStore`] trait; the manager keeps no authoritative state in process.

mod clock;
mod hasher;
mod service;
mod traits;
mod types;

#[cfg(test)]
pub(crate) mod tests;

pub use clock::{Clock, ManualClock, SystemClock};
pub use hasher::CodeHasher;
pub use otp_shared::config::OtpConfig;
pub use service::OtpLifecycleManager;
pub use traits::KeyValueStore;
pub use types::{DeliveryCheck, IssuedCode, VerifyFailure, VerifyOutcome};
