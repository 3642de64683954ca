//! Business services containing domain logic and use cases.

pub mod otp;
pub mod reset;

// Re-export commonly used types
pub use otp::{
    Clock, CodeHasher, DeliveryCheck, IssuedCode, KeyValueStore, ManualClock,
    OtpConfig, OtpLifecycleManager, SystemClock, VerifyFailure, VerifyOutcome,
};
pub use reset::{
    CodeRequestOutcome, Mailer, PasswordMutator, PasswordResetService,
    ResetFlowConfig, ResetOutcome, UserDirectory,
};
