//! User Entity

use chrono::{DateTime, Utc};

use crate::domain::value_object::{AddressId, Email, Mobile, UserId, UserName, UserPassword};

/// User entity
///
/// Holds the registered account with its credentials. The email is
/// optional and only trusted once `email_verified` is set through the
/// mailed verification link.
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    /// User name (unique, for login and display)
    pub user_name: UserName,
    pub password_hash: UserPassword,
    /// Mobile number (unique, confirmed by sms code at registration)
    pub mobile: Mobile,
    pub email: Option<Email>,
    pub email_verified: bool,
    /// Default shipping address, if the user picked one
    pub default_address_id: Option<AddressId>,
    /// Last successful login time
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user
    pub fn new(user_name: UserName, password_hash: UserPassword, mobile: Mobile) -> Self {
        let now = Utc::now();
        Self {
            user_id: UserId::new(),
            user_name,
            password_hash,
            mobile,
            email: None,
            email_verified: false,
            default_address_id: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record successful login
    pub fn record_login(&mut self) {
        let now = Utc::now();
        self.last_login_at = Some(now);
        self.updated_at = now;
    }

    /// Attach an email address; verification starts over
    pub fn set_email(&mut self, email: Email) {
        self.email = Some(email);
        self.email_verified = false;
        self.updated_at = Utc::now();
    }

    /// Mark the current email as verified
    pub fn mark_email_verified(&mut self) {
        self.email_verified = true;
        self.updated_at = Utc::now();
    }

    /// Pick the default shipping address
    pub fn set_default_address(&mut self, address_id: AddressId) {
        self.default_address_id = Some(address_id);
        self.updated_at = Utc::now();
    }
}
