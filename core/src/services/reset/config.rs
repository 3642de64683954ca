//! Configuration for the password reset flow

/// Subject line used when none is configured
pub const DEFAULT_MAIL_SUBJECT: &str = "Your password reset code";

/// Configuration for the password reset flow
#[derive(Debug, Clone)]
pub struct ResetFlowConfig {
    /// Subject line of the code email
    pub mail_subject: String,
}

impl ResetFlowConfig {
    /// Use a custom subject line
    pub fn with_mail_subject(mut self, subject: impl Into<String>) -> Self {
        self.mail_subject = subject.into();
        self
    }
}

impl Default for ResetFlowConfig {
    fn default() -> Self {
        Self {
            mail_subject: DEFAULT_MAIL_SUBJECT.to_string(),
        }
    }
}
