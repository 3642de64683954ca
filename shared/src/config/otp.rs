//! OTP lifecycle policy configuration
//!
//! Built once at process start and injected into the lifecycle manager.
//! Nothing re-reads these values per request.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default validity window for a code (10 minutes)
pub const DEFAULT_TTL_SECONDS: u64 = 600;

/// Default minimum spacing between deliveries
pub const DEFAULT_RESEND_COOLDOWN_SECONDS: u64 = 30;

/// Default number of resends allowed per entry
pub const DEFAULT_MAX_RESENDS: u32 = 5;

/// Default number of verification attempts allowed per entry
pub const DEFAULT_MAX_VERIFY_ATTEMPTS: u32 = 5;

/// Default number of digits in a code
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Default bcrypt cost for code hashes
pub const DEFAULT_HASH_COST: u32 = 10;

/// Default key namespace for stored entries
pub const DEFAULT_KEY_PREFIX: &str = "otp:password_reset";

/// OTP lifecycle configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OtpConfig {
    /// Validity window of an issued code in seconds
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,

    /// Minimum seconds between two deliveries to the same subject
    #[serde(default = "default_resend_cooldown_seconds")]
    pub resend_cooldown_seconds: u64,

    /// Maximum number of resends per entry
    #[serde(default = "default_max_resends")]
    pub max_resends: u32,

    /// Maximum number of verification attempts per entry
    #[serde(default = "default_max_verify_attempts")]
    pub max_verify_attempts: u32,

    /// Number of digits in a generated code
    #[serde(default = "default_code_length")]
    pub code_length: usize,

    /// bcrypt cost factor used to hash codes
    #[serde(default = "default_hash_cost")]
    pub hash_cost: u32,

    /// Store key namespace
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_TTL_SECONDS,
            resend_cooldown_seconds: DEFAULT_RESEND_COOLDOWN_SECONDS,
            max_resends: DEFAULT_MAX_RESENDS,
            max_verify_attempts: DEFAULT_MAX_VERIFY_ATTEMPTS,
            code_length: DEFAULT_CODE_LENGTH,
            hash_cost: DEFAULT_HASH_COST,
            key_prefix: default_key_prefix(),
        }
    }
}

impl OtpConfig {
    /// Validity window as a duration
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    /// Resend cooldown as a duration
    pub fn resend_cooldown(&self) -> Duration {
        Duration::from_secs(self.resend_cooldown_seconds)
    }

    /// Set the validity window
    pub fn with_ttl_seconds(mut self, seconds: u64) -> Self {
        self.ttl_seconds = seconds;
        self
    }

    /// Set the resend cooldown
    pub fn with_resend_cooldown_seconds(mut self, seconds: u64) -> Self {
        self.resend_cooldown_seconds = seconds;
        self
    }

    /// Set the bcrypt cost
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    /// Set the store key namespace
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Check that the policy is internally consistent
    pub fn validate(&self) -> Result<(), String> {
        if self.ttl_seconds == 0 {
            return Err("otp.ttl_seconds must be greater than zero".to_string());
        }
        if self.resend_cooldown_seconds >= self.ttl_seconds {
            return Err(format!(
                "otp.resend_cooldown_seconds ({}) must be shorter than otp.ttl_seconds ({})",
                self.resend_cooldown_seconds, self.ttl_seconds
            ));
        }
        if !(4..=9).contains(&self.code_length) {
            return Err(format!(
                "otp.code_length must be between 4 and 9 digits, got {}",
                self.code_length
            ));
        }
        if !(4..=31).contains(&self.hash_cost) {
            return Err(format!(
                "otp.hash_cost must be between 4 and 31, got {}",
                self.hash_cost
            ));
        }
        if self.max_verify_attempts == 0 {
            return Err("otp.max_verify_attempts must be greater than zero".to_string());
        }
        if self.key_prefix.trim().is_empty() {
            return Err("otp.key_prefix must not be empty".to_string());
        }
        Ok(())
    }
}

fn default_ttl_seconds() -> u64 {
    DEFAULT_TTL_SECONDS
}

fn default_resend_cooldown_seconds() -> u64 {
    DEFAULT_RESEND_COOLDOWN_SECONDS
}

fn default_max_resends() -> u32 {
    DEFAULT_MAX_RESENDS
}

fn default_max_verify_attempts() -> u32 {
    DEFAULT_MAX_VERIFY_ATTEMPTS
}

fn default_code_length() -> usize {
    DEFAULT_CODE_LENGTH
}

fn default_hash_cost() -> u32 {
    DEFAULT_HASH_COST
}

fn default_key_prefix() -> String {
    DEFAULT_KEY_PREFIX.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OtpConfig::default();
        assert_eq!(config.ttl(), Duration::from_secs(600));
        assert_eq!(config.resend_cooldown(), Duration::from_secs(30));
        assert_eq!(config.max_resends, 5);
        assert_eq!(config.max_verify_attempts, 5);
        assert_eq!(config.code_length, 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_cooldown_longer_than_ttl() {
        let config = OtpConfig::default()
            .with_ttl_seconds(60)
            .with_resend_cooldown_seconds(60);
        assert!(config.validate().unwrap_err().contains("resend_cooldown_seconds"));
    }

    #[test]
    fn test_validate_rejects_bad_code_length_and_cost() {
        let mut config = OtpConfig::default();
        config.code_length = 3;
        assert!(config.validate().is_err());

        let config = OtpConfig::default().with_hash_cost(2);
        assert!(config.validate().unwrap_err().contains("hash_cost"));
    }

    #[test]
    fn test_validate_rejects_empty_prefix() {
        let config = OtpConfig::default().with_key_prefix("  ");
        assert!(config.validate().is_err());
    }
}
