//! Shared configuration and utilities for the password-reset OTP service
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types (OTP policy, store backend, mail, logging)
//! - Email validation
//! - Log masking helpers

pub mod config;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, Environment, LoggingConfig, LogFormat,
    CacheConfig, StoreBackend, StoreConfig,
    MailConfig, OtpConfig, UserAdminConfig,
};
pub use utils::{mask, validation};
