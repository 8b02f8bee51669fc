//! API DTOs (Data Transfer Objects)
//!
//! Field names follow the public JSON contract (`sms_code`, `user_id`,
//! `email_active`, ...), so no serde renaming is applied.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entity::Address;

// ============================================================================
// Registration
// ============================================================================

/// Request for POST /api/users
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub password2: String,
    pub sms_code: String,
    pub mobile: String,
    /// Agreement checkbox, must be "true"
    pub allow: String,
}

/// Response for POST /api/users
#[derive(Debug, Clone, Serialize)]
pub struct RegisterResponse {
    pub id: Uuid,
    pub username: String,
    pub mobile: String,
    pub token: String,
}

/// Response for GET /api/users/usernames/{username}/count
#[derive(Debug, Clone, Serialize)]
pub struct UsernameCountResponse {
    pub username: String,
    pub count: i64,
}

/// Response for GET /api/users/mobiles/{mobile}/count
#[derive(Debug, Clone, Serialize)]
pub struct MobileCountResponse {
    pub mobile: String,
    pub count: i64,
}

// ============================================================================
// Login
// ============================================================================

/// Request for POST /api/authorizations
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// User name or mobile number
    pub username: String,
    pub password: String,
}

/// Token-bearing response (login, oauth callback, binding)
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: Uuid,
    pub username: String,
}

// ============================================================================
// Profile
// ============================================================================

/// Response for GET /api/users/detail
#[derive(Debug, Clone, Serialize)]
pub struct UserDetailResponse {
    pub id: Uuid,
    pub username: String,
    pub mobile: String,
    pub email: Option<String>,
    pub email_active: bool,
}

/// Request for PUT /api/users/email
#[derive(Debug, Clone, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

/// Response for PUT /api/users/email
#[derive(Debug, Clone, Serialize)]
pub struct EmailResponse {
    pub id: Uuid,
    pub email: String,
}

/// Query for GET /api/users/email/verification
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyEmailQuery {
    pub token: Option<String>,
}

/// Plain confirmation response
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn ok() -> Self {
        Self {
            message: "OK".to_string(),
        }
    }
}

// ============================================================================
// OAuth
// ============================================================================

/// Query for GET /api/oauth/qq/authorization
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizationQuery {
    /// Page to return to after the provider round-trip
    pub next: Option<String>,
}

/// Response for GET /api/oauth/qq/authorization
#[derive(Debug, Clone, Serialize)]
pub struct LoginUrlResponse {
    pub login_url: String,
}

/// Query for GET /api/oauth/qq/user
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
}

/// Response for an unbound oauth identity
#[derive(Debug, Clone, Serialize)]
pub struct BindingTokenResponse {
    pub access_token: String,
}

/// Request for POST /api/oauth/qq/user
#[derive(Debug, Clone, Deserialize)]
pub struct BindOAuthRequest {
    pub access_token: String,
    pub mobile: String,
    pub password: String,
    pub sms_code: String,
}

// ============================================================================
// Addresses
// ============================================================================

/// Request body for address creation/update
#[derive(Debug, Clone, Deserialize)]
pub struct AddressRequest {
    pub title: String,
    pub receiver: String,
    pub province: String,
    pub city: String,
    pub district: String,
    pub place: String,
    pub mobile: String,
    #[serde(default)]
    pub tel: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// One address in responses
#[derive(Debug, Clone, Serialize)]
pub struct AddressResponse {
    pub id: Uuid,
    pub title: String,
    pub receiver: String,
    pub province: String,
    pub city: String,
    pub district: String,
    pub place: String,
    pub mobile: String,
    pub tel: Option<String>,
    pub email: Option<String>,
}

impl From<&Address> for AddressResponse {
    fn from(address: &Address) -> Self {
        Self {
            id: address.address_id.into_uuid(),
            title: address.title.clone(),
            receiver: address.receiver.clone(),
            province: address.province.clone(),
            city: address.city.clone(),
            district: address.district.clone(),
            place: address.place.clone(),
            mobile: address.mobile.as_str().to_string(),
            tel: address.tel.clone(),
            email: address.email.clone(),
        }
    }
}

/// Response for GET /api/addresses
#[derive(Debug, Clone, Serialize)]
pub struct AddressListResponse {
    pub user_id: Uuid,
    pub default_address_id: Option<Uuid>,
    pub limit: usize,
    pub addresses: Vec<AddressResponse>,
}

/// Request for PUT /api/addresses/{address_id}/title
#[derive(Debug, Clone, Deserialize)]
pub struct AddressTitleRequest {
    pub title: String,
}
