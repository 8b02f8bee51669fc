//! Account Middleware
//!
//! Bearer-token authentication for protected routes. Sessions are
//! stateless: a request is authenticated purely by verifying the token
//! signature and expiry.

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::config::AccountConfig;
use crate::application::tokens;
use crate::error::AccountError;

/// Authenticated caller, stored in request extensions
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: Uuid,
    pub username: String,
    pub email: Option<String>,
}

/// Middleware that requires a valid session token
pub async fn require_session(
    axum::extract::State(config): axum::extract::State<Arc<AccountConfig>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let Some(token) = bearer_token(req.headers()) else {
        return Err((StatusCode::UNAUTHORIZED, [("X-Auth-Required", "true")]).into_response());
    };

    let claims = match tokens::verify_session(&token, &config) {
        Ok(claims) => claims,
        Err(_) => return Err(AccountError::InvalidToken.into_response()),
    };

    req.extensions_mut().insert(CurrentUser {
        user_id: claims.user_id,
        username: claims.username,
        email: claims.email,
    });

    Ok(next.run(req).await)
}

/// Extract the token from an `Authorization: Bearer ..` header
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def.ghi"),
        );
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_bearer_token_missing_or_malformed() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic xyz"));
        assert_eq!(bearer_token(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }
}
