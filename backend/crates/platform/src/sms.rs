//! SMS Gateway Client
//!
//! Thin client for a template-SMS REST vendor. Sends are fail-fast: a
//! non-2xx answer or a transport error is reported once and never
//! retried. Without a configured endpoint the client logs and skips.

use std::time::Duration;

use thiserror::Error;
use tracing::info;

/// Request timeout for the gateway call
const GATEWAY_TIMEOUT: Duration = Duration::from_secs(5);

/// SMS gateway configuration
#[derive(Debug, Clone)]
pub struct SmsConfig {
    /// Vendor endpoint URL; empty means no-op mode
    pub endpoint: String,
    pub app_id: String,
    pub app_key: String,
    /// Vendor template for "your code is {1}, valid for {2} minutes"
    pub template_id: u32,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            app_id: String::new(),
            app_key: String::new(),
            template_id: 1,
        }
    }
}

/// SMS sending errors
#[derive(Debug, Error)]
pub enum SmsError {
    #[error("SMS gateway request failed: {0}")]
    Request(String),

    #[error("SMS gateway rejected the send: status {0}")]
    Gateway(u16),
}

/// SMS sender (gateway or no-op)
#[derive(Clone)]
pub struct SmsSender {
    http: reqwest::Client,
    config: SmsConfig,
}

impl SmsSender {
    pub fn new(config: SmsConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Whether a real gateway endpoint is configured
    pub fn is_enabled(&self) -> bool {
        !self.config.endpoint.trim().is_empty()
    }

    /// Send a verification code via the template SMS gateway
    pub async fn send_code(
        &self,
        mobile: &str,
        code: &str,
        expires_minutes: u64,
    ) -> Result<(), SmsError> {
        if !self.is_enabled() {
            info!(
                mobile = %mask_mobile(mobile),
                code,
                "SMS gateway not configured; send skipped"
            );
            return Ok(());
        }

        let payload = serde_json::json!({
            "app_id": self.config.app_id,
            "app_key": self.config.app_key,
            "mobile": mobile,
            "template_id": self.config.template_id,
            "params": [code, expires_minutes.to_string()],
        });

        let response = self
            .http
            .post(&self.config.endpoint)
            .timeout(GATEWAY_TIMEOUT)
            .json(&payload)
            .send()
            .await
            .map_err(|e| SmsError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SmsError::Gateway(response.status().as_u16()));
        }

        info!(mobile = %mask_mobile(mobile), "Sms verification code sent");
        Ok(())
    }
}

/// Mask a mobile number for logs, e.g. `138****1111`
pub fn mask_mobile(mobile: &str) -> String {
    if mobile.len() < 8 {
        return "*".repeat(mobile.len());
    }
    format!("{}****{}", &mobile[..3], &mobile[mobile.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_mobile() {
        assert_eq!(mask_mobile("13800001111"), "138****1111");
        assert_eq!(mask_mobile("1234"), "****");
    }

    #[test]
    fn test_noop_mode() {
        let sender = SmsSender::new(SmsConfig::default());
        assert!(!sender.is_enabled());
    }

    #[tokio::test]
    async fn test_noop_send_succeeds() {
        let sender = SmsSender::new(SmsConfig::default());
        sender.send_code("13800001111", "123456", 5).await.unwrap();
    }
}
