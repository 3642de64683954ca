//! # Infrastructure Layer
//!
//! This crate provides the concrete implementations behind the traits of the
//! password-reset OTP core:
//!
//! - **Cache**: Redis client and the Redis-backed OTP store, plus an
//!   in-memory store for development
//! - **Mail**: transactional email over HTTP and a mock mailer
//! - **Directory**: user-admin API client for email lookup and password changes
//! - **Config / Logging**: layered configuration loading and tracing setup

use std::sync::Arc;

use otp_core::services::{
    KeyValueStore, Mailer, OtpLifecycleManager, PasswordMutator, PasswordResetService,
    ResetFlowConfig, UserDirectory,
};
use otp_shared::config::AppConfig;

// Re-export core types for convenience
pub use otp_core::errors::*;

/// Cache module - Redis client and OTP stores
pub mod cache;

/// Configuration loading
pub mod config;

/// User-admin service client
pub mod directory;

/// Tracing subscriber setup
pub mod logging;

/// Mail delivery services
pub mod mail;

pub use config::load_config;

/// Reset flow wired to trait objects, as assembled by [`build_services`]
pub type DynPasswordResetService =
    PasswordResetService<dyn KeyValueStore, dyn UserDirectory, dyn Mailer, dyn PasswordMutator>;

/// Infrastructure service container
#[derive(Clone)]
pub struct ResetServices {
    /// Effective configuration
    pub config: AppConfig,
    /// OTP store
    pub store: Arc<dyn KeyValueStore>,
    /// OTP lifecycle manager
    pub otp: Arc<OtpLifecycleManager<dyn KeyValueStore>>,
    /// Password reset flow
    pub reset: Arc<DynPasswordResetService>,
}

/// Initialize infrastructure services
///
/// This function:
/// - Loads and validates configuration
/// - Connects the OTP store
/// - Creates the mail service and user-admin client
/// - Wires the lifecycle manager and the reset flow
pub async fn initialize() -> Result<ResetServices, InfrastructureError> {
    tracing::info!("Initializing infrastructure services...");

    let config = load_config()?;
    let services = build_services(config).await?;

    tracing::info!("Infrastructure services initialized successfully");

    Ok(services)
}

/// Wire all services from an already loaded configuration
pub async fn build_services(config: AppConfig) -> Result<ResetServices, InfrastructureError> {
    let store = cache::create_store(&config.store, config.environment).await?;
    let mailer = mail::create_mail_service(&config.mail)?;
    let user_admin = Arc::new(directory::UserAdminClient::new(&config.user_admin)?);

    let otp = Arc::new(
        OtpLifecycleManager::new(store.clone(), config.otp.clone())
            .map_err(|e| InfrastructureError::Config(e.to_string()))?,
    );

    let directory: Arc<dyn UserDirectory> = user_admin.clone();
    let passwords: Arc<dyn PasswordMutator> = user_admin;

    let reset = Arc::new(PasswordResetService::new(
        otp.clone(),
        directory,
        mailer,
        passwords,
        ResetFlowConfig::default().with_mail_subject(config.mail.subject.clone()),
    ));

    Ok(ResetServices {
        config,
        store,
        otp,
        reset,
    })
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Mail service error
    #[error("Mail service error: {0}")]
    Mail(String),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}
