//! Verification Code Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Key layout, value objects, code generation
//! - `application/` - Use cases and configuration
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Image verification codes rendered as PNG captchas
//! - Sms verification codes (6 digits, zero-padded)
//! - Per-mobile send throttling via a short-lived flag
//!
//! ## Security Model
//! - Image codes are single-use: a comparison consumes the stored text
//! - Codes live only in the TTL cache store and expire automatically
//! - Sms dispatch is deferred to the background worker, never inline

pub mod application;
pub mod domain;
pub mod error;
pub mod presentation;

// Re-exports for convenience
pub use application::config::VerifyConfig;
pub use error::{VerifyError, VerifyResult};
pub use presentation::router::verify_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::value_objects::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod router {
    pub use crate::presentation::router::*;
}
