//! Application Layer - Use Cases

pub mod addresses;
pub mod bind_oauth;
pub mod config;
pub mod email_binding;
pub mod oauth_login;
pub mod sign_in;
pub mod sign_up;
pub mod tokens;

pub use addresses::{AddressInput, AddressListOutput, AddressesUseCase};
pub use bind_oauth::{BindOAuthInput, BindOAuthUseCase};
pub use email_binding::{
    UpdateEmailInput, UpdateEmailOutput, UpdateEmailUseCase, VerifyEmailUseCase,
};
pub use oauth_login::{OAuthLoginOutput, OAuthLoginUseCase};
pub use sign_in::{SignInInput, SignInOutput, SignInUseCase};
pub use sign_up::{SignUpInput, SignUpOutput, SignUpUseCase};
