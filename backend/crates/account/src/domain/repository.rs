//! Repository Traits
//!
//! Interfaces for data persistence and the external identity provider.
//! Implementations live in the infrastructure layer.

use crate::domain::entity::{Address, OAuthBinding, User};
use crate::domain::value_object::{AddressId, Mobile, UserId, UserName};
use crate::error::AccountResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Create a new user
    async fn create(&self, user: &User) -> AccountResult<()>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: &UserId) -> AccountResult<Option<User>>;

    /// Find user by user name (canonical form)
    async fn find_by_user_name(&self, user_name: &UserName) -> AccountResult<Option<User>>;

    /// Find user by mobile number
    async fn find_by_mobile(&self, mobile: &Mobile) -> AccountResult<Option<User>>;

    /// Count users with this user name (availability probe)
    async fn count_by_user_name(&self, user_name: &str) -> AccountResult<i64>;

    /// Count users with this mobile number (availability probe)
    async fn count_by_mobile(&self, mobile: &str) -> AccountResult<i64>;

    /// Update user
    async fn update(&self, user: &User) -> AccountResult<()>;
}

/// Address repository trait
#[trait_variant::make(AddressRepository: Send)]
pub trait LocalAddressRepository {
    /// Create a new address
    async fn create(&self, address: &Address) -> AccountResult<()>;

    /// Find address by ID (deleted ones included)
    async fn find_by_id(&self, address_id: &AddressId) -> AccountResult<Option<Address>>;

    /// All live addresses of a user, most recently updated first
    async fn find_live_by_user(&self, user_id: &UserId) -> AccountResult<Vec<Address>>;

    /// Number of live addresses of a user
    async fn count_live_by_user(&self, user_id: &UserId) -> AccountResult<i64>;

    /// Update address
    async fn update(&self, address: &Address) -> AccountResult<()>;
}

/// OAuth binding repository trait
#[trait_variant::make(OAuthBindingRepository: Send)]
pub trait LocalOAuthBindingRepository {
    /// Create a binding (bindings are immutable, there is no update)
    async fn create(&self, binding: &OAuthBinding) -> AccountResult<()>;

    /// Find binding by provider identity
    async fn find_by_openid(&self, openid: &str) -> AccountResult<Option<OAuthBinding>>;
}

/// External identity provider trait (QQ graph API in production)
#[trait_variant::make(IdentityProvider: Send)]
pub trait LocalIdentityProvider {
    /// Authorization URL the client should be sent to
    fn login_url(&self, state: &str) -> String;

    /// Exchange an authorization code for a provider access token
    async fn exchange_code(&self, code: &str) -> AccountResult<String>;

    /// Resolve the provider user id behind an access token
    async fn fetch_openid(&self, access_token: &str) -> AccountResult<String>;
}
