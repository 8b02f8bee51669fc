//! Application Configuration
//!
//! Configuration for the account application layer.

use std::time::Duration;

/// Account application configuration
#[derive(Debug, Clone)]
pub struct AccountConfig {
    /// Secret for signing session/binding/email tokens
    pub token_secret: String,
    /// Session token lifetime (24 hours)
    pub session_ttl: Duration,
    /// Binding token lifetime (10 minutes)
    pub binding_token_ttl: Duration,
    /// Email-verification token lifetime (24 hours)
    pub email_token_ttl: Duration,
    /// Base URL of the email-verification landing page
    pub verify_email_base_url: String,
    /// Maximum live addresses per user
    pub address_limit: usize,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            token_secret: String::new(),
            session_ttl: Duration::from_secs(24 * 3600),
            binding_token_ttl: Duration::from_secs(600),
            email_token_ttl: Duration::from_secs(24 * 3600),
            verify_email_base_url: "http://localhost:8080/success_verify_email.html".to_string(),
            address_limit: 20,
            password_pepper: None,
        }
    }
}

impl AccountConfig {
    /// Create config with a random token secret (for development)
    pub fn with_random_secret() -> Self {
        use rand::Rng;
        let secret: String = rand::rng()
            .sample_iter(rand::distr::Alphanumeric)
            .take(43)
            .map(char::from)
            .collect();
        Self {
            token_secret: secret,
            ..Default::default()
        }
    }

    /// Create config for development
    pub fn development() -> Self {
        Self::with_random_secret()
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }
}
