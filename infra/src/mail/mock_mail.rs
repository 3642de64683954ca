//! Mock Mail Service Implementation
//!
//! Records messages instead of sending them. With console output enabled the
//! full message, code included, is printed for local development.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};
use uuid::Uuid;

use otp_core::errors::{DomainError, DomainResult};
use otp_core::services::Mailer;
use otp_shared::utils::mask_email;

/// A message accepted by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    /// Mock message id
    pub id: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Mock mail service for development and testing
#[derive(Clone)]
pub struct MockMailService {
    /// Every message accepted so far
    sent: Arc<Mutex<Vec<SentMail>>>,
    /// Counter for tracking number of messages sent
    message_count: Arc<AtomicU64>,
    /// Whether to simulate failures (for testing)
    simulate_failure: Arc<AtomicBool>,
    /// Whether to print messages to console
    console_output: bool,
}

impl MockMailService {
    /// Create a new mock mail service
    pub fn new() -> Self {
        Self::with_options(true, false)
    }

    /// Create a mock service with configurable options
    pub fn with_options(console_output: bool, simulate_failure: bool) -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            message_count: Arc::new(AtomicU64::new(0)),
            simulate_failure: Arc::new(AtomicBool::new(simulate_failure)),
            console_output,
        }
    }

    /// Get the total number of messages sent
    pub fn get_message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }

    /// All recorded messages, oldest first
    pub fn sent_messages(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Most recent message
    pub fn last_message(&self) -> Option<SentMail> {
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }

    /// Enable or disable failure simulation
    pub fn set_simulate_failure(&self, simulate: bool) {
        self.simulate_failure.store(simulate, Ordering::SeqCst);
    }

    /// Forget recorded messages and reset the counter
    pub fn reset(&self) {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clear();
        self.message_count.store(0, Ordering::SeqCst);
    }
}

impl Default for MockMailService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Mailer for MockMailService {
    async fn send_mail(&self, to: &str, subject: &str, body: &str) -> DomainResult<()> {
        if self.simulate_failure.load(Ordering::SeqCst) {
            warn!(
                "Mock mail service simulating failure for recipient: {}",
                mask_email(to)
            );
            return Err(DomainError::delivery("Simulated mail sending failure"));
        }

        let id = format!("mock_{}", Uuid::new_v4());
        let count = self.message_count.fetch_add(1, Ordering::SeqCst) + 1;

        if self.console_output {
            println!("\n{}", "=".repeat(60));
            println!("MOCK MAIL SERVICE - MESSAGE #{}", count);
            println!("{}", "=".repeat(60));
            println!("To: {}", to);
            println!("Subject: {}", subject);
            println!("Message ID: {}", id);
            println!("{}", body);
            println!("{}\n", "=".repeat(60));
        }

        info!(
            target: "mail_service",
            provider = "mock",
            to = %mask_email(to),
            message_id = %id,
            "Mail sent successfully (mock)"
        );

        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(SentMail {
                id,
                to: to.to_string(),
                subject: subject.to_string(),
                body: body.to_string(),
            });

        Ok(())
    }
}
