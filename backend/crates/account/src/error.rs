//! Account Error Types
//!
//! This module provides account-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::value_object::user_name::UserNameError;

/// Account-specific result type alias
pub type AccountResult<T> = Result<T, AccountError>;

/// Account-specific error variants
#[derive(Debug, Error)]
pub enum AccountError {
    /// User not found
    #[error("User not found")]
    UserNotFound,

    /// User name already exists
    #[error("User name already exists")]
    UserNameTaken,

    /// Mobile number already registered
    #[error("Mobile number already registered")]
    MobileTaken,

    /// Invalid credentials (wrong password or unknown identifier)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Sms code wrong, expired or already consumed
    #[error("Invalid sms verification code")]
    InvalidSmsCode,

    /// Session or email-verification token failed verification
    #[error("Invalid or expired token")]
    InvalidToken,

    /// Binding token failed verification
    #[error("Invalid or expired binding token")]
    InvalidBindingToken,

    /// OAuth identity already bound to a local user
    #[error("OAuth identity already bound")]
    AlreadyBound,

    /// Address not found (or owned by someone else)
    #[error("Address not found")]
    AddressNotFound,

    /// Per-user address limit reached
    #[error("Address limit reached")]
    AddressLimitExceeded,

    /// Malformed request input
    #[error("{0}")]
    Validation(String),

    /// External identity provider failure
    #[error("Identity provider error: {0}")]
    Provider(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Cache store error
    #[error("Cache store error: {0}")]
    Store(#[from] platform::cache::CacheError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AccountError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AccountError::UserNotFound | AccountError::AddressNotFound => StatusCode::NOT_FOUND,
            AccountError::UserNameTaken
            | AccountError::MobileTaken
            | AccountError::AlreadyBound => StatusCode::CONFLICT,
            AccountError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AccountError::InvalidSmsCode
            | AccountError::InvalidToken
            | AccountError::InvalidBindingToken
            | AccountError::AddressLimitExceeded
            | AccountError::Validation(_) => StatusCode::BAD_REQUEST,
            AccountError::Provider(_) => StatusCode::SERVICE_UNAVAILABLE,
            AccountError::Database(_) | AccountError::Store(_) | AccountError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AccountError::UserNotFound | AccountError::AddressNotFound => ErrorKind::NotFound,
            AccountError::UserNameTaken
            | AccountError::MobileTaken
            | AccountError::AlreadyBound => ErrorKind::Conflict,
            AccountError::InvalidCredentials => ErrorKind::Unauthorized,
            AccountError::InvalidSmsCode
            | AccountError::InvalidToken
            | AccountError::InvalidBindingToken
            | AccountError::AddressLimitExceeded
            | AccountError::Validation(_) => ErrorKind::BadRequest,
            AccountError::Provider(_) => ErrorKind::ServiceUnavailable,
            AccountError::Database(_) | AccountError::Store(_) | AccountError::Internal(_) => {
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
            AccountError::Provider(msg) => {
                // Provider failures are always recorded before responding
                tracing::error!(message = %msg, "Identity provider error");
            }
            AccountError::Database(e) => {
                tracing::error!(error = %e, "Account database error");
            }
            AccountError::Store(e) => {
                tracing::error!(error = %e, "Account cache store error");
            }
            AccountError::Internal(msg) => {
                tracing::error!(message = %msg, "Account internal error");
            }
            AccountError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AccountError::InvalidToken | AccountError::InvalidBindingToken => {
                tracing::warn!(error = %self, "Token verification failed");
            }
            _ => {
                tracing::debug!(error = %self, "Account error");
            }
        }
    }
}

impl IntoResponse for AccountError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AccountError {
    fn from(err: AppError) -> Self {
        AccountError::Validation(err.message().to_string())
    }
}

impl From<UserNameError> for AccountError {
    fn from(err: UserNameError) -> Self {
        AccountError::Validation(err.to_string())
    }
}
