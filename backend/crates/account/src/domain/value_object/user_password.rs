//! User Password Value Objects
//!
//! Thin domain wrappers over the platform password primitives. The raw
//! password never leaves the application layer; only the PHC hash is
//! persisted.

use platform::password::{
    ClearTextPassword, HashedPassword, PasswordHashError, PasswordPolicyError,
};

/// Validated clear-text password (zeroized on drop)
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Validate a raw password against the registration policy
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        Ok(Self(ClearTextPassword::new(raw)?))
    }

    fn inner(&self) -> &ClearTextPassword {
        &self.0
    }
}

/// Stored password hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPassword {
    hash: HashedPassword,
}

impl UserPassword {
    /// Hash a validated raw password
    pub fn from_raw(raw: &RawPassword, pepper: Option<&[u8]>) -> Result<Self, PasswordHashError> {
        Ok(Self {
            hash: raw.inner().hash(pepper)?,
        })
    }

    /// Restore from the stored PHC string
    pub fn from_db(phc: String) -> Result<Self, PasswordHashError> {
        Ok(Self {
            hash: HashedPassword::from_phc_string(phc)?,
        })
    }

    /// Verify a raw password against this hash
    pub fn verify(&self, raw: &RawPassword, pepper: Option<&[u8]>) -> bool {
        self.hash.verify(raw.inner(), pepper)
    }

    /// PHC string for storage
    pub fn as_str(&self) -> &str {
        self.hash.as_phc_string()
    }
}
