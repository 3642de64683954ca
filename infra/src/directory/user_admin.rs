//! User-admin HTTP client
//!
//! - `GET {base}/users/{id}` returns `{ "email": "..." }`; 404 means unknown
//! - `PUT {base}/users/{id}/password` with `{ "password": "..." }`

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

use otp_core::errors::{DomainError, DomainResult};
use otp_core::services::{PasswordMutator, UserDirectory};
use otp_shared::config::UserAdminConfig;
use otp_shared::utils::{mask_email, mask_subject};

use crate::InfrastructureError;

#[derive(Debug, Deserialize)]
struct UserRecord {
    email: String,
}

#[derive(Serialize)]
struct SetPasswordRequest<'a> {
    password: &'a str,
}

/// Client for the user-admin API
#[derive(Clone)]
pub struct UserAdminClient {
    client: reqwest::Client,
    base_url: Url,
    api_token: String,
}

impl UserAdminClient {
    /// Create a new client
    pub fn new(config: &UserAdminConfig) -> Result<Self, InfrastructureError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            InfrastructureError::Config(format!("Invalid user-admin URL '{}': {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(InfrastructureError::Config(format!(
                "User-admin URL cannot be a base: {}",
                config.base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        info!("User-admin client initialized for {}", base_url);

        Ok(Self {
            client,
            base_url,
            api_token: config.api_token.clone(),
        })
    }

    /// `{base}/users/{subject_id}[/{suffix}]` with the subject id encoded as one segment
    fn user_url(&self, subject_id: &str, suffix: Option<&str>) -> Result<Url, InfrastructureError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                InfrastructureError::Config("User-admin URL cannot be a base".to_string())
            })?;
            segments.pop_if_empty().push("users").push(subject_id);
            if let Some(suffix) = suffix {
                segments.push(suffix);
            }
        }
        Ok(url)
    }

    async fn fetch_email(&self, subject_id: &str) -> Result<Option<String>, InfrastructureError> {
        let url = self.user_url(subject_id, None)?;
        debug!("Looking up email for subject {}", mask_subject(subject_id));

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_token)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let record: UserRecord = response.json().await?;
                debug!(
                    "Resolved subject {} to {}",
                    mask_subject(subject_id),
                    mask_email(&record.email)
                );
                Ok(Some(record.email))
            }
            status => Err(InfrastructureError::General(format!(
                "User lookup failed with status {}",
                status
            ))),
        }
    }

    async fn put_password(&self, subject_id: &str, new_password: &str) -> Result<(), InfrastructureError> {
        let url = self.user_url(subject_id, Some("password"))?;

        let response = self
            .client
            .put(url)
            .bearer_auth(&self.api_token)
            .json(&SetPasswordRequest { password: new_password })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            info!("Password updated for subject {}", mask_subject(subject_id));
            Ok(())
        } else {
            error!(
                "Password update for subject {} failed with status {}",
                mask_subject(subject_id),
                status
            );
            Err(InfrastructureError::General(format!(
                "Password update failed with status {}",
                status
            )))
        }
    }
}

#[async_trait]
impl UserDirectory for UserAdminClient {
    async fn email_for(&self, subject_id: &str) -> DomainResult<Option<String>> {
        self.fetch_email(subject_id)
            .await
            .map_err(|e| DomainError::directory(e.to_string()))
    }
}

#[async_trait]
impl PasswordMutator for UserAdminClient {
    async fn set_password(&self, subject_id: &str, new_password: &str) -> DomainResult<()> {
        self.put_password(subject_id, new_password)
            .await
            .map_err(|e| DomainError::directory(e.to_string()))
    }
}
