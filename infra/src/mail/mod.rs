//! Mail Service Module
//!
//! Delivery of password reset codes by email.
//!
//! ## Providers
//!
//! - **HTTP**: JSON POST to a transactional email API with a bearer token
//! - **Mock**: records and logs messages for development and tests

use std::sync::Arc;

use otp_core::services::Mailer;
use otp_shared::config::MailConfig;

use crate::InfrastructureError;

pub mod http_mail;
pub mod mock_mail;

pub use http_mail::HttpMailService;
pub use mock_mail::{MockMailService, SentMail};

#[cfg(test)]
mod tests;

/// Create a mail service based on configuration
///
/// # Arguments
///
/// * `config` - Mail configuration containing provider settings
///
/// # Returns
///
/// The configured mailer, or a configuration error for an unknown provider
pub fn create_mail_service(config: &MailConfig) -> Result<Arc<dyn Mailer>, InfrastructureError> {
    match config.provider.as_str() {
        "mock" => {
            tracing::warn!("Using mock mail service; reset codes are not delivered");
            Ok(Arc::new(MockMailService::new()))
        }
        "http" => Ok(Arc::new(HttpMailService::new(config)?)),
        other => Err(InfrastructureError::Config(format!(
            "Unknown mail provider '{}'",
            other
        ))),
    }
}
