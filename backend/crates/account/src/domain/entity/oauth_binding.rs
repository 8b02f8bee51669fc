//! OAuth Binding Entity

use chrono::{DateTime, Utc};

use crate::domain::value_object::UserId;

/// Mapping from a provider identity to a local user
///
/// Immutable once created: a binding is never re-pointed at another
/// user, and an openid can appear at most once.
#[derive(Debug, Clone)]
pub struct OAuthBinding {
    /// Provider user id (openid)
    pub openid: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl OAuthBinding {
    /// Create a new binding
    pub fn new(openid: String, user_id: UserId) -> Self {
        Self {
            openid,
            user_id,
            created_at: Utc::now(),
        }
    }
}
