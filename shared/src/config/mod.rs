//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `otp` - OTP lifecycle policy (TTL, cooldown, caps, hashing)
//! - `cache` - Store backend selection and Redis configuration
//! - `external` - Mail provider and user-admin service endpoints
//! - `environment` - Environment detection and logging configuration

pub mod cache;
pub mod environment;
pub mod external;
pub mod otp;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use cache::{CacheConfig, StoreBackend, StoreConfig};
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use external::{MailConfig, UserAdminConfig};
pub use otp::OtpConfig;

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    #[serde(default)]
    pub environment: Environment,

    /// OTP lifecycle policy
    #[serde(default)]
    pub otp: OtpConfig,

    /// OTP store backend
    #[serde(default)]
    pub store: StoreConfig,

    /// Transactional mail provider
    #[serde(default)]
    pub mail: MailConfig,

    /// User-admin service (directory lookup and password mutation)
    #[serde(default)]
    pub user_admin: UserAdminConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::development()
    }
}

impl AppConfig {
    /// Create configuration for development environment
    ///
    /// Uses the in-memory store and the mock mailer so the service runs
    /// without any external infrastructure.
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            otp: OtpConfig::default(),
            store: StoreConfig::memory(),
            mail: MailConfig::mock(),
            user_admin: UserAdminConfig::default(),
            logging: LoggingConfig::for_environment(Environment::Development),
        }
    }

    /// Create configuration for production environment
    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            otp: OtpConfig::default(),
            store: StoreConfig::redis(CacheConfig::default()),
            mail: MailConfig::default(),
            user_admin: UserAdminConfig::default(),
            logging: LoggingConfig::for_environment(Environment::Production),
        }
    }

    /// Baseline configuration for the environment named by `ENVIRONMENT`
    pub fn for_environment(env: Environment) -> Self {
        match env {
            Environment::Development => Self::development(),
            Environment::Production => Self::production(),
            Environment::Staging => {
                let mut config = Self::production();
                config.environment = Environment::Staging;
                config.logging = LoggingConfig::for_environment(Environment::Staging);
                config
            }
        }
    }

    /// Validate cross-section constraints
    pub fn validate(&self) -> Result<(), String> {
        self.otp.validate()?;
        if self.environment.is_production() && self.store.backend == StoreBackend::Memory {
            return Err(
                "In-memory OTP store is a development backend and cannot be used in production"
                    .to_string(),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_development_defaults_use_local_backends() {
        let config = AppConfig::development();
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.mail.provider, "mock");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_production_rejects_memory_store() {
        let mut config = AppConfig::production();
        assert!(config.validate().is_ok());

        config.store = StoreConfig::memory();
        let err = config.validate().unwrap_err();
        assert!(err.contains("cannot be used in production"));
    }

    #[test]
    fn test_staging_inherits_production_backends() {
        let config = AppConfig::for_environment(Environment::Staging);
        assert_eq!(config.environment, Environment::Staging);
        assert_eq!(config.store.backend, StoreBackend::Redis);
    }

    #[test]
    fn test_deserialize_partial_document() {
        let config: AppConfig = serde_json::from_str(
            r#"{ "environment": "production", "otp": { "ttl_seconds": 300 } }"#,
        )
        .unwrap();

        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.otp.ttl_seconds, 300);
        assert_eq!(config.otp.max_resends, 5);
    }
}
