//! Domain Entities

pub mod address;
pub mod oauth_binding;
pub mod user;

pub use address::{Address, AddressFields};
pub use oauth_binding::OAuthBinding;
pub use user::User;
