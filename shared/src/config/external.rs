//! External service configuration (mail provider and user-admin service)

use serde::{Deserialize, Serialize};

/// Transactional mail provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MailConfig {
    /// Provider name ("http", "mock")
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Send endpoint of the mail API
    #[serde(default)]
    pub api_url: String,

    /// Bearer token for the mail API
    #[serde(default)]
    pub api_key: String,

    /// Sender address
    #[serde(default = "default_from_address")]
    pub from_address: String,

    /// Subject line of reset code emails
    #[serde(default = "default_subject")]
    pub subject: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_url: String::new(),
            api_key: String::new(),
            from_address: default_from_address(),
            subject: default_subject(),
            request_timeout_secs: default_timeout(),
        }
    }
}

impl MailConfig {
    /// Mock provider that logs instead of sending
    pub fn mock() -> Self {
        Self {
            provider: String::from("mock"),
            ..Default::default()
        }
    }
}

/// User-admin service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserAdminConfig {
    /// Base URL of the user-admin API
    #[serde(default = "default_user_admin_url")]
    pub base_url: String,

    /// Service token sent as a bearer credential
    #[serde(default)]
    pub api_token: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for UserAdminConfig {
    fn default() -> Self {
        Self {
            base_url: default_user_admin_url(),
            api_token: String::new(),
            request_timeout_secs: default_timeout(),
        }
    }
}

fn default_provider() -> String {
    String::from("http")
}

fn default_from_address() -> String {
    String::from("no-reply@example.com")
}

fn default_subject() -> String {
    String::from("Your password reset code")
}

fn default_timeout() -> u64 {
    10
}

fn default_user_admin_url() -> String {
    String::from("http://localhost:8081")
}
