//! Domain Value Objects

use kernel::error::app_error::{AppError, AppResult};
use std::fmt;

/// Maximum accepted length for a client-chosen image code id
const IMAGE_CODE_ID_MAX_LENGTH: usize = 64;

// ============================================================================
// ImageCodeId
// ============================================================================

/// Client-generated identifier for an image verification code
///
/// # Invariants
/// - Non-empty, at most 64 characters
/// - Characters limited to ASCII alphanumerics, `_` and `-`
///   (a UUID fits naturally)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageCodeId(String);

impl ImageCodeId {
    /// Validate a raw image code id
    pub fn new(raw: impl AsRef<str>) -> AppResult<Self> {
        let raw = raw.as_ref().trim();

        if raw.is_empty() {
            return Err(AppError::bad_request("Image code id cannot be empty"));
        }
        if raw.len() > IMAGE_CODE_ID_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "Image code id must be at most {} characters",
                IMAGE_CODE_ID_MAX_LENGTH
            )));
        }
        if !raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(AppError::bad_request("Invalid image code id"));
        }

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageCodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Mobile
// ============================================================================

/// Validated mobile number
///
/// # Invariants
/// - Exactly 11 ASCII digits
/// - Starts with `1`, second digit `3`-`9`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mobile(String);

impl Mobile {
    /// Validate a raw mobile number
    pub fn new(raw: impl AsRef<str>) -> AppResult<Self> {
        let raw = raw.as_ref().trim();

        let mut chars = raw.chars();
        let valid = raw.len() == 11
            && chars.next() == Some('1')
            && matches!(chars.next(), Some('3'..='9'))
            && raw.chars().all(|c| c.is_ascii_digit());

        if !valid {
            return Err(AppError::bad_request("Invalid mobile number"));
        }

        Ok(Self(raw.to_string()))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Masked form for logs, e.g. `138****1111`
    pub fn masked(&self) -> String {
        platform::sms::mask_mobile(&self.0)
    }
}

impl fmt::Display for Mobile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Mobile {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod image_code_id {
        use super::*;

        #[test]
        fn test_valid() {
            assert!(ImageCodeId::new("b9f164f2-1df9-44b0-a3f8-1c2e9e4a0a6f").is_ok());
            assert!(ImageCodeId::new("abc_123").is_ok());
        }

        #[test]
        fn test_invalid() {
            assert!(ImageCodeId::new("").is_err());
            assert!(ImageCodeId::new("   ").is_err());
            assert!(ImageCodeId::new("has space").is_err());
            assert!(ImageCodeId::new("slash/id").is_err());
            assert!(ImageCodeId::new("a".repeat(65)).is_err());
        }
    }

    mod mobile {
        use super::*;

        #[test]
        fn test_valid() {
            assert!(Mobile::new("13800001111").is_ok());
            assert!(Mobile::new("19912345678").is_ok());
            assert!(Mobile::new(" 13800001111 ").is_ok());
        }

        #[test]
        fn test_invalid() {
            assert!(Mobile::new("").is_err());
            assert!(Mobile::new("12800001111").is_err()); // second digit 2
            assert!(Mobile::new("23800001111").is_err()); // does not start with 1
            assert!(Mobile::new("1380000111").is_err()); // too short
            assert!(Mobile::new("138000011112").is_err()); // too long
            assert!(Mobile::new("1380000111a").is_err()); // non-digit
        }

        #[test]
        fn test_masked() {
            let mobile = Mobile::new("13800001111").unwrap();
            assert_eq!(mobile.masked(), "138****1111");
        }
    }
}
