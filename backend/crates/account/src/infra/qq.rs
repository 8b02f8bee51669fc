//! QQ Connect Identity Provider
//!
//! Client for the QQ graph API. The endpoints answer in two legacy
//! formats that predate JSON-everywhere:
//!
//! - token endpoint: form-encoded body
//!   `access_token=..&expires_in=..&refresh_token=..`
//! - openid endpoint: a JSONP-style wrapper
//!   `callback( {"client_id":"..","openid":".."} );`
//!
//! Any non-2xx answer, timeout or unparseable body maps to a provider
//! error; there are no retries.

use std::time::Duration;

use reqwest::Client;

use crate::domain::repository::IdentityProvider;
use crate::error::{AccountError, AccountResult};

const AUTHORIZE_URL: &str = "https://graph.qq.com/oauth2.0/authorize";
const TOKEN_URL: &str = "https://graph.qq.com/oauth2.0/token";
const OPENID_URL: &str = "https://graph.qq.com/oauth2.0/me";

/// QQ Connect configuration
#[derive(Debug, Clone)]
pub struct QqConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    /// Timeout for each outbound provider call
    pub timeout: Duration,
}

impl Default for QqConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: String::new(),
            timeout: Duration::from_secs(5),
        }
    }
}

/// QQ Connect provider client
#[derive(Clone)]
pub struct QqProvider {
    http: Client,
    config: QqConfig,
}

impl QqProvider {
    pub fn new(config: QqConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }
}

impl IdentityProvider for QqProvider {
    fn login_url(&self, state: &str) -> String {
        format!(
            "{}?response_type=code&client_id={}&redirect_uri={}&state={}&scope=get_user_info",
            AUTHORIZE_URL,
            self.config.client_id,
            urlencoding::encode(&self.config.redirect_uri),
            urlencoding::encode(state),
        )
    }

    async fn exchange_code(&self, code: &str) -> AccountResult<String> {
        let response = self
            .http
            .get(TOKEN_URL)
            .timeout(self.config.timeout)
            .query(&[
                ("grant_type", "authorization_code"),
                ("client_id", &self.config.client_id),
                ("client_secret", &self.config.client_secret),
                ("code", code),
                ("redirect_uri", &self.config.redirect_uri),
            ])
            .send()
            .await
            .map_err(|e| AccountError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AccountError::Provider(format!(
                "token endpoint returned {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AccountError::Provider(e.to_string()))?;

        parse_token_response(&body).ok_or_else(|| {
            AccountError::Provider("token endpoint answer missing access_token".to_string())
        })
    }

    async fn fetch_openid(&self, access_token: &str) -> AccountResult<String> {
        let response = self
            .http
            .get(OPENID_URL)
            .timeout(self.config.timeout)
            .query(&[("access_token", access_token)])
            .send()
            .await
            .map_err(|e| AccountError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AccountError::Provider(format!(
                "openid endpoint returned {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AccountError::Provider(e.to_string()))?;

        parse_openid_callback(&body).ok_or_else(|| {
            AccountError::Provider("openid endpoint answer missing openid".to_string())
        })
    }
}

/// Pull `access_token` out of a form-encoded answer
fn parse_token_response(body: &str) -> Option<String> {
    body.trim().split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == "access_token" && !value.is_empty()).then(|| value.to_string())
    })
}

/// Pull `openid` out of a `callback( {...} );` wrapper
fn parse_openid_callback(body: &str) -> Option<String> {
    let body = body.trim().trim_end_matches(';').trim_end();
    let inner = body.strip_prefix("callback(")?.strip_suffix(')')?;

    let value: serde_json::Value = serde_json::from_str(inner.trim()).ok()?;
    value.get("openid")?.as_str().map(str::to_string)
}
