//! Signed Tokens
//!
//! Issues and verifies the three token kinds of the account domain, all
//! HS256-signed against the configured secret:
//!
//! - session tokens (24 h) carrying the user identity claims
//! - binding tokens (10 min) carrying only the provider openid
//! - email-verification tokens (24 h) carrying user id + email
//!
//! The claim sets are disjoint, so a token of one kind can never pass
//! verification as another.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::config::AccountConfig;
use crate::domain::entity::User;
use crate::error::{AccountError, AccountResult};

/// Claims of an authenticated session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub user_id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

/// Claims authorizing completion of an oauth binding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindingClaims {
    pub openid: String,
    pub exp: i64,
}

/// Claims embedded in the email-verification link
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailVerifyClaims {
    pub user_id: Uuid,
    pub email: String,
    pub exp: i64,
}

fn sign<C: Serialize>(claims: &C, config: &AccountConfig) -> AccountResult<String> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(config.token_secret.as_bytes()),
    )
    .map_err(|e| AccountError::Internal(format!("Token signing failed: {}", e)))
}

fn decode_claims<C: for<'de> Deserialize<'de>>(
    token: &str,
    config: &AccountConfig,
) -> Result<C, jsonwebtoken::errors::Error> {
    decode::<C>(
        token,
        &DecodingKey::from_secret(config.token_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

/// Issue a session token for a user
pub fn issue_session(user: &User, config: &AccountConfig) -> AccountResult<String> {
    let now = Utc::now().timestamp();
    let claims = SessionClaims {
        user_id: user.user_id.into_uuid(),
        username: user.user_name.original().to_string(),
        email: user.email.as_ref().map(|e| e.as_str().to_string()),
        iat: now,
        exp: now + config.session_ttl.as_secs() as i64,
    };
    sign(&claims, config)
}

/// Verify a session token
pub fn verify_session(token: &str, config: &AccountConfig) -> AccountResult<SessionClaims> {
    decode_claims(token, config).map_err(|_| AccountError::InvalidToken)
}

/// Issue a binding token over a provider identity
pub fn issue_binding(openid: &str, config: &AccountConfig) -> AccountResult<String> {
    let claims = BindingClaims {
        openid: openid.to_string(),
        exp: Utc::now().timestamp() + config.binding_token_ttl.as_secs() as i64,
    };
    sign(&claims, config)
}

/// Verify a binding token
pub fn verify_binding(token: &str, config: &AccountConfig) -> AccountResult<BindingClaims> {
    decode_claims(token, config).map_err(|_| AccountError::InvalidBindingToken)
}

/// Issue an email-verification token
pub fn issue_email_verify(
    user_id: Uuid,
    email: &str,
    config: &AccountConfig,
) -> AccountResult<String> {
    let claims = EmailVerifyClaims {
        user_id,
        email: email.to_string(),
        exp: Utc::now().timestamp() + config.email_token_ttl.as_secs() as i64,
    };
    sign(&claims, config)
}

/// Verify an email-verification token
pub fn verify_email_token(
    token: &str,
    config: &AccountConfig,
) -> AccountResult<EmailVerifyClaims> {
    decode_claims(token, config).map_err(|_| AccountError::InvalidToken)
}
