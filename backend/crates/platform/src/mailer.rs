//! SMTP Mailer
//!
//! Async SMTP transport wrapper. When no SMTP host is configured the
//! mailer runs in no-op mode and only logs, which keeps local
//! development and tests free of mail infrastructure.

use std::sync::Arc;

use lettre::message::{Mailbox, Message, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use thiserror::Error;
use tracing::{info, warn};

/// Mailer configuration
#[derive(Debug, Clone)]
pub struct MailerConfig {
    /// SMTP relay host; empty means no-op mode
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    /// Sender mailbox, e.g. `Mall <noreply@example.com>`
    pub from: String,
    /// STARTTLS instead of implicit TLS
    pub use_starttls: bool,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            smtp_host: String::new(),
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            from: "Mall <noreply@example.com>".to_string(),
            use_starttls: true,
        }
    }
}

/// Mailer errors
#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid mail address: {0}")]
    Address(String),

    #[error("Failed to build message: {0}")]
    Message(String),

    #[error("SMTP transport failed: {0}")]
    Transport(String),
}

/// Async mail sender (SMTP or no-op)
#[derive(Clone)]
pub struct Mailer {
    transport: Option<Arc<AsyncSmtpTransport<Tokio1Executor>>>,
    from: Mailbox,
}

impl Mailer {
    /// Build the mailer from configuration
    ///
    /// An empty SMTP host yields a no-op mailer that logs instead of
    /// sending.
    pub fn new(config: &MailerConfig) -> Result<Self, MailError> {
        let from = config
            .from
            .parse::<Mailbox>()
            .map_err(|e| MailError::Address(format!("invalid from address: {}", e)))?;

        let transport = if config.smtp_host.trim().is_empty() {
            warn!("SMTP host not configured; mailer will operate in no-op mode");
            None
        } else {
            let builder = if config.use_starttls {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            } else {
                AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            }
            .map_err(|e| MailError::Transport(e.to_string()))?
            .port(config.smtp_port);

            let builder = if let (Some(username), Some(password)) =
                (&config.smtp_username, &config.smtp_password)
            {
                builder.credentials(Credentials::new(username.clone(), password.clone()))
            } else {
                builder
            };

            Some(Arc::new(builder.build()))
        };

        Ok(Self { transport, from })
    }

    /// Whether a real SMTP transport is configured
    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    /// Send the email-verification link
    pub async fn send_verify_email(
        &self,
        recipient: &str,
        verify_url: &str,
    ) -> Result<(), MailError> {
        let subject = "Verify your email address";
        let body = format!(
            "Please click the following link to verify your email address:\n{}\n\nIf you did not request this, please ignore this email.",
            verify_url
        );

        let Some(transport) = &self.transport else {
            info!(recipient, "Mailer disabled; verification email skipped");
            return Ok(());
        };

        let to = recipient
            .parse::<Mailbox>()
            .map_err(|e| MailError::Address(e.to_string()))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(header::ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| MailError::Message(e.to_string()))?;

        transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        info!(recipient, "Verification email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_mode_when_host_empty() {
        let mailer = Mailer::new(&MailerConfig::default()).unwrap();
        assert!(!mailer.is_enabled());
    }

    #[test]
    fn test_invalid_from_address() {
        let config = MailerConfig {
            from: "not an address".to_string(),
            ..MailerConfig::default()
        };
        assert!(matches!(Mailer::new(&config), Err(MailError::Address(_))));
    }

    #[tokio::test]
    async fn test_noop_send_succeeds() {
        let mailer = Mailer::new(&MailerConfig::default()).unwrap();
        mailer
            .send_verify_email("user@example.com", "http://localhost/verify?token=abc")
            .await
            .unwrap();
    }
}
