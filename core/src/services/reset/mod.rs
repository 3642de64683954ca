//! Password reset flow built on the OTP lifecycle manager
//!
//! Looks up the account email, sends codes by mail with resend throttling,
//! and applies a new password once a code has been verified.

mod config;
mod service;
mod traits;
mod types;

#[cfg(test)]
mod tests;

pub use config::{ResetFlowConfig, DEFAULT_MAIL_SUBJECT};
pub use service::PasswordResetService;
pub use traits::{Mailer, PasswordMutator, UserDirectory};
pub use types::{CodeRequestOutcome, ResetOutcome};
