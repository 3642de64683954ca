//! Domain error types.
//!
//! Only infrastructure failures are errors. Absence of an entry and policy
//! denials (cooldown, limit, invalid code, ...) are ordinary return values.

use thiserror::Error;

/// Core domain errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Store error: {message}")]
    Store { message: String },

    #[error("Hashing error: {message}")]
    Hashing { message: String },

    #[error("Delivery error: {message}")]
    Delivery { message: String },

    #[error("Directory error: {message}")]
    Directory { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    /// Store unreachable or rejected the command
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store { message: message.into() }
    }

    /// Mail delivery failed
    pub fn delivery(message: impl Into<String>) -> Self {
        Self::Delivery { message: message.into() }
    }

    /// Directory or password service failed
    pub fn directory(message: impl Into<String>) -> Self {
        Self::Directory { message: message.into() }
    }

    /// Stable machine-readable code for server-side logs
    pub fn code(&self) -> &'static str {
        match self {
            Self::Store { .. } => "STORE_UNAVAILABLE",
            Self::Hashing { .. } => "HASHING_FAILED",
            Self::Delivery { .. } => "DELIVERY_FAILED",
            Self::Directory { .. } => "DIRECTORY_UNAVAILABLE",
            Self::Configuration { .. } => "CONFIGURATION_INVALID",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
