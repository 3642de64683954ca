//! Example walking through a password reset
//!
//! This example shows how to:
//! - Request a reset code and see the mailed message
//! - Hit the resend cooldown, then resend after it passes
//! - Confirm the reset with the mailed code
//!
//! Uses Redis when `REDIS_URL` is set, the in-memory store otherwise.
//! Run with: cargo run -p otp_infra --example password_reset_demo

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::Arc;

use otp_core::errors::DomainResult;
use otp_core::services::{
    KeyValueStore, ManualClock, OtpConfig, OtpLifecycleManager, PasswordMutator,
    PasswordResetService, ResetFlowConfig, UserDirectory,
};
use otp_infra::cache::{CacheConfig, InMemoryStore, RedisClient, RedisStore};
use otp_infra::logging::init_tracing;
use otp_infra::mail::MockMailService;
use otp_shared::config::{Environment, LoggingConfig};

/// A single demo account
struct DemoAccount;

#[async_trait]
impl UserDirectory for DemoAccount {
    async fn email_for(&self, subject_id: &str) -> DomainResult<Option<String>> {
        Ok((subject_id == "demo-user").then(|| "demo@example.com".to_string()))
    }
}

#[async_trait]
impl PasswordMutator for DemoAccount {
    async fn set_password(&self, subject_id: &str, _new_password: &str) -> DomainResult<()> {
        println!("Password changed for {}", subject_id);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(&LoggingConfig::for_environment(Environment::Development))?;

    println!("Password Reset Demo");
    println!("===================\n");

    let clock = Arc::new(ManualClock::new(Utc::now()));

    let store: Arc<dyn KeyValueStore> = match std::env::var("REDIS_URL") {
        Ok(url) => {
            println!("Connecting to Redis at: {}", url);
            let client = RedisClient::new(&CacheConfig::new(url))
                .await
                .context("Redis connection failed")?;
            Arc::new(RedisStore::new(client))
        }
        Err(_) => {
            println!("REDIS_URL not set, using the in-memory store");
            Arc::new(InMemoryStore::with_clock(clock.clone()))
        }
    };

    let otp = OtpLifecycleManager::with_clock(store, OtpConfig::default(), clock.clone())?;
    let mailer = Arc::new(MockMailService::new());
    let account = Arc::new(DemoAccount);

    let service = PasswordResetService::new(
        Arc::new(otp),
        account.clone(),
        mailer.clone(),
        account,
        ResetFlowConfig::default(),
    );

    // 1. First request mails a code
    let outcome = service.request_code("demo-user").await?;
    println!("Request code: {:?}\n", outcome);

    // 2. Immediate retry is throttled
    let outcome = service.request_code("demo-user").await?;
    println!("Request again right away: {:?}\n", outcome);

    // 3. After the cooldown a fresh code is mailed
    clock.advance(Duration::seconds(30));
    let outcome = service.request_code("demo-user").await?;
    println!("Request after cooldown: {:?}\n", outcome);

    // 4. Confirm with the code from the latest mail
    let message = mailer
        .last_message()
        .ok_or_else(|| anyhow!("no mail was sent"))?;
    let code: String = message
        .body
        .split("code is ")
        .nth(1)
        .unwrap_or_default()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();

    let outcome = service
        .confirm_reset("demo-user", &code, "a much better password")
        .await?;
    println!("Confirm reset: {:?}", outcome);

    Ok(())
}
