//! Traits for the collaborators of the reset flow

use async_trait::async_trait;

use crate::errors::DomainResult;

/// Looks up the email address registered for a subject
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Email for the subject, `None` if the subject is unknown
    async fn email_for(&self, subject_id: &str) -> DomainResult<Option<String>>;
}

/// Sends plain-text mail
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver one message
    async fn send_mail(&self, to: &str, subject: &str, body: &str) -> DomainResult<()>;
}

/// Applies a new password to an account
#[async_trait]
pub trait PasswordMutator: Send + Sync {
    /// Replace the subject's password
    async fn set_password(&self, subject_id: &str, new_password: &str) -> DomainResult<()>;
}
