//! Password reset flow implementation

use std::sync::Arc;
use tracing::{error, info, warn};

use otp_shared::utils::{mask_email, mask_subject};

use crate::errors::DomainResult;
use crate::services::otp::{DeliveryCheck, KeyValueStore, OtpLifecycleManager, VerifyOutcome};

use super::config::ResetFlowConfig;
use super::traits::{Mailer, PasswordMutator, UserDirectory};
use super::types::{CodeRequestOutcome, ResetOutcome};

/// Drives a password reset from code request to password change
pub struct PasswordResetService<S, D, M, P>
where
    S: KeyValueStore + ?Sized,
    D: UserDirectory + ?Sized,
    M: Mailer + ?Sized,
    P: PasswordMutator + ?Sized,
{
    /// OTP lifecycle
    otp: Arc<OtpLifecycleManager<S>>,
    /// Account email lookup
    directory: Arc<D>,
    /// Mail delivery
    mailer: Arc<M>,
    /// Password writes
    passwords: Arc<P>,
    /// Flow configuration
    config: ResetFlowConfig,
}

impl<S, D, M, P> PasswordResetService<S, D, M, P>
where
    S: KeyValueStore + ?Sized,
    D: UserDirectory + ?Sized,
    M: Mailer + ?Sized,
    P: PasswordMutator + ?Sized,
{
    /// Create a new reset service
    ///
    /// # Arguments
    ///
    /// * `otp` - Lifecycle manager owning the code entries
    /// * `directory` - Source of account email addresses
    /// * `mailer` - Outbound mail
    /// * `passwords` - Account password writer
    /// * `config` - Flow configuration
    pub fn new(
        otp: Arc<OtpLifecycleManager<S>>,
        directory: Arc<D>,
        mailer: Arc<M>,
        passwords: Arc<P>,
        config: ResetFlowConfig,
    ) -> Self {
        Self {
            otp,
            directory,
            mailer,
            passwords,
            config,
        }
    }

    /// Underlying lifecycle manager
    pub fn otp(&self) -> &OtpLifecycleManager<S> {
        &self.otp
    }

    /// Send a reset code, or a fresh code for the live entry
    pub async fn request_code(&self, subject_id: &str) -> DomainResult<CodeRequestOutcome> {
        let email = match self.directory.email_for(subject_id).await? {
            Some(email) => email,
            None => {
                info!(
                    subject = %mask_subject(subject_id),
                    "Reset requested for unknown subject"
                );
                return Ok(CodeRequestOutcome::UnknownSubject);
            }
        };

        let check = self.otp.can_deliver(subject_id).await?;
        if check != DeliveryCheck::Allowed {
            warn!(
                subject = %mask_subject(subject_id),
                reason = check.reason().unwrap_or_default(),
                "Reset code delivery denied"
            );
            return Ok(CodeRequestOutcome::Denied { check });
        }

        // Resends go to the address captured at issuance. The replacement is
        // only stored once it has been delivered, so a failed send leaves the
        // previously delivered code valid.
        if let Some(reissued) = self.otp.reissue(subject_id).await? {
            if let Err(e) = self.send_code(&reissued.entry.email, reissued.code()).await {
                error!(
                    subject = %mask_subject(subject_id),
                    email = %mask_email(&reissued.entry.email),
                    error = %e,
                    "Failed to resend reset code, keeping the previous one"
                );
                return Err(e);
            }

            if !self.otp.commit_reissue(subject_id, &reissued).await? {
                warn!(
                    subject = %mask_subject(subject_id),
                    "Resent code could not be stored, the entry changed or expired"
                );
            }

            return Ok(CodeRequestOutcome::Resent {
                resend_count: reissued.entry.resend_count.saturating_add(1),
            });
        }

        let issued = self.otp.issue(subject_id, &email).await?;
        if let Err(e) = self.send_code(&email, issued.code()).await {
            error!(
                subject = %mask_subject(subject_id),
                email = %mask_email(&email),
                error = %e,
                "Failed to send reset code, revoking it"
            );
            if let Err(revoke_err) = self.otp.revoke(subject_id).await {
                error!(
                    subject = %mask_subject(subject_id),
                    error = %revoke_err,
                    "Failed to revoke undelivered reset code"
                );
            }
            return Err(e);
        }

        Ok(CodeRequestOutcome::Sent {
            expires_at: issued.entry.expires_at,
        })
    }

    /// Verify a code and apply the new password
    ///
    /// The code stays valid if the password write fails, so the caller may
    /// retry within the remaining attempts.
    pub async fn confirm_reset(
        &self,
        subject_id: &str,
        code: &str,
        new_password: &str,
    ) -> DomainResult<ResetOutcome> {
        match self.otp.verify(subject_id, code).await? {
            VerifyOutcome::Verified => {}
            VerifyOutcome::Rejected(reason) => return Ok(ResetOutcome::Rejected(reason)),
        }

        self.passwords.set_password(subject_id, new_password).await?;
        self.otp.revoke(subject_id).await?;

        info!(
            subject = %mask_subject(subject_id),
            event = "password_reset_completed",
            "Password reset completed"
        );

        Ok(ResetOutcome::Completed)
    }

    /// Abandon a reset in progress
    pub async fn cancel(&self, subject_id: &str) -> DomainResult<()> {
        self.otp.revoke(subject_id).await
    }

    async fn send_code(&self, to: &str, code: &str) -> DomainResult<()> {
        self.mailer
            .send_mail(to, &self.config.mail_subject, &self.mail_body(code))
            .await
    }

    fn mail_body(&self, code: &str) -> String {
        let minutes = (self.otp.config().ttl_seconds + 59) / 60;
        format!(
            "Your password reset code is {}.\n\n\
             It expires in {} minutes. If you did not ask to reset your password, \
             you can ignore this email.",
            code, minutes
        )
    }
}
