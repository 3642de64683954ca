//! User-admin service integration
//!
//! Resolves the email address of a subject and applies new passwords through
//! the user-admin HTTP API.

pub mod user_admin;

pub use user_admin::UserAdminClient;
