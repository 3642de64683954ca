//! Common utility functions

pub mod mask;
pub mod validation;

// Re-export commonly used utilities
pub use mask::{mask_email, mask_subject};
pub use validation::is_valid_email;
