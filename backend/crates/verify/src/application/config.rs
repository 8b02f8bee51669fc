//! Application Configuration
//!
//! Configuration for the verification application layer.

use std::time::Duration;

/// Verification application configuration
#[derive(Debug, Clone)]
pub struct VerifyConfig {
    /// Image code TTL (5 minutes)
    pub image_code_ttl: Duration,
    /// Sms code TTL (5 minutes)
    pub sms_code_ttl: Duration,
    /// Minimum interval between sms sends to one mobile
    pub send_interval: Duration,
    /// Characters rendered into the image code
    pub image_code_chars: usize,
    /// Digits in the sms code
    pub sms_code_digits: usize,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            image_code_ttl: Duration::from_secs(300),
            sms_code_ttl: Duration::from_secs(300),
            send_interval: Duration::from_secs(60),
            image_code_chars: 4,
            sms_code_digits: 6,
        }
    }
}

impl VerifyConfig {
    /// Sms code lifetime in whole minutes (for the SMS template)
    pub fn sms_code_ttl_minutes(&self) -> u64 {
        self.sms_code_ttl.as_secs() / 60
    }
}
