//! # Password-Reset OTP Core
//!
//! Core business logic for issuing and verifying one-time passcodes that gate
//! a password reset. This crate contains the OTP entry entity, the lifecycle
//! manager, the reset flow service, the collaborator traits they depend on,
//! and the domain error types.

pub mod domain;
pub mod errors;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use services::*;
