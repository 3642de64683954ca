//! HTTP Mail Service Implementation
//!
//! Sends plain-text email through a transactional email API. The request is
//! a JSON POST authenticated with a bearer token:
//!
//! ```json
//! { "from": "no-reply@example.com", "to": ["alice@example.com"],
//!   "subject": "Your password reset code", "text": "..." }
//! ```
//!
//! Rate limiting (429) and server errors are retried with exponential
//! backoff; other client errors fail immediately.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use otp_core::errors::{DomainError, DomainResult};
use otp_core::services::Mailer;
use otp_shared::config::MailConfig;
use otp_shared::utils::{is_valid_email, mask_email};

use crate::InfrastructureError;

/// Default number of send attempts
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default initial retry delay in milliseconds
const DEFAULT_RETRY_DELAY_MS: u64 = 500;

/// Upper bound for the backoff between attempts
const MAX_RETRY_DELAY_MS: u64 = 5000;

#[derive(Debug, Serialize)]
struct SendMailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
}

/// Transactional email over HTTP
pub struct HttpMailService {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    from_address: String,
    max_retries: u32,
    retry_delay_ms: u64,
}

impl HttpMailService {
    /// Create a new HTTP mail service
    pub fn new(config: &MailConfig) -> Result<Self, InfrastructureError> {
        if config.api_url.is_empty() {
            return Err(InfrastructureError::Config("Mail API URL is not set".to_string()));
        }
        if !is_valid_email(&config.from_address) {
            return Err(InfrastructureError::Config(format!(
                "Invalid sender address: {}",
                config.from_address
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        info!(
            "HTTP mail service initialized with sender: {}",
            mask_email(&config.from_address)
        );

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            from_address: config.from_address.clone(),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
        })
    }

    /// Override the retry policy
    pub fn with_retry(mut self, max_retries: u32, retry_delay_ms: u64) -> Self {
        self.max_retries = max_retries.max(1);
        self.retry_delay_ms = retry_delay_ms;
        self
    }

    /// Send with retry logic
    async fn send_with_retry(&self, to: &str, subject: &str, body: &str) -> Result<(), InfrastructureError> {
        let request = SendMailRequest {
            from: &self.from_address,
            to: [to],
            subject,
            text: body,
        };

        let mut attempts = 0;
        let mut delay = Duration::from_millis(self.retry_delay_ms);

        loop {
            attempts += 1;

            debug!(
                "Sending mail attempt {}/{} to {}",
                attempts,
                self.max_retries,
                mask_email(to)
            );

            let result = self
                .client
                .post(&self.api_url)
                .bearer_auth(&self.api_key)
                .json(&request)
                .send()
                .await;

            let last_error = match result {
                Ok(response) if response.status().is_success() => {
                    info!("Mail sent successfully to {}", mask_email(to));
                    return Ok(());
                }
                Ok(response) => {
                    let status = response.status();
                    error!(
                        "Mail API rejected message (attempt {}/{}): {}",
                        attempts, self.max_retries, status
                    );

                    if !is_retryable_status(status) {
                        return Err(InfrastructureError::Mail(format!(
                            "Mail API rejected message: {}",
                            status
                        )));
                    }
                    InfrastructureError::Mail(format!("Mail API returned {}", status))
                }
                Err(e) => {
                    error!(
                        "Failed to reach mail API (attempt {}/{}): {}",
                        attempts, self.max_retries, e
                    );
                    InfrastructureError::Http(e)
                }
            };

            if attempts >= self.max_retries {
                return Err(last_error);
            }

            warn!("Retrying mail delivery after {:?}", delay);
            tokio::time::sleep(delay).await;
            delay = next_retry_delay(delay);
        }
    }
}

#[async_trait]
impl Mailer for HttpMailService {
    async fn send_mail(&self, to: &str, subject: &str, body: &str) -> DomainResult<()> {
        if !is_valid_email(to) {
            return Err(DomainError::delivery(format!(
                "Invalid recipient address: {}",
                mask_email(to)
            )));
        }

        self.send_with_retry(to, subject, body)
            .await
            .map_err(|e| DomainError::delivery(e.to_string()))
    }
}

/// Double the backoff, capped at `MAX_RETRY_DELAY_MS`
pub(crate) fn next_retry_delay(delay: Duration) -> Duration {
    (delay * 2).min(Duration::from_millis(MAX_RETRY_DELAY_MS))
}

/// Rate limiting and server errors are worth another try
pub(crate) fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}
