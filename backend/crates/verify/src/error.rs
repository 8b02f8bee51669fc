//! Verify Error Types
//!
//! This module provides verification-specific error variants that
//! integrate with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Verify-specific result type alias
pub type VerifyResult<T> = Result<T, VerifyError>;

/// Verify-specific error variants
#[derive(Debug, Error)]
pub enum VerifyError {
    /// Submitted image code is wrong, expired or already used
    #[error("Invalid image verification code")]
    InvalidImageCode,

    /// An sms code was requested for this mobile too recently
    #[error("Sms code was requested too recently")]
    RateLimited,

    /// Malformed request input
    #[error("{0}")]
    Validation(String),

    /// Captcha rendering failed
    #[error("Image rendering failed")]
    CaptchaRender,

    /// Cache store error
    #[error("Cache store error: {0}")]
    Store(#[from] platform::cache::CacheError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl VerifyError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            VerifyError::InvalidImageCode
            | VerifyError::RateLimited
            | VerifyError::Validation(_) => StatusCode::BAD_REQUEST,
            VerifyError::CaptchaRender | VerifyError::Store(_) | VerifyError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            VerifyError::InvalidImageCode
            | VerifyError::RateLimited
            | VerifyError::Validation(_) => ErrorKind::BadRequest,
            VerifyError::CaptchaRender | VerifyError::Store(_) | VerifyError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            VerifyError::Store(e) => {
                tracing::error!(error = %e, "Verify cache store error");
            }
            VerifyError::CaptchaRender => {
                tracing::error!("Captcha rendering failed");
            }
            VerifyError::Internal(msg) => {
                tracing::error!(message = %msg, "Verify internal error");
            }
            VerifyError::RateLimited => {
                tracing::warn!("Sms send throttled");
            }
            _ => {
                tracing::debug!(error = %self, "Verify error");
            }
        }
    }
}

impl IntoResponse for VerifyError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for VerifyError {
    fn from(err: AppError) -> Self {
        VerifyError::Validation(err.message().to_string())
    }
}
