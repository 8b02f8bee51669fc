//! Sign In Use Case
//!
//! Authenticates a user and issues a session token.

use std::sync::Arc;
use uuid::Uuid;

use crate::application::config::AccountConfig;
use crate::application::tokens;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{Mobile, RawPassword, UserName};
use crate::error::{AccountError, AccountResult};

/// Sign in input
pub struct SignInInput {
    /// User name or mobile number
    pub username: String,
    pub password: String,
}

/// Sign in output
#[derive(Debug)]
pub struct SignInOutput {
    pub token: String,
    pub user_id: Uuid,
    pub username: String,
}

/// Sign in use case
pub struct SignInUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AccountConfig>,
}

impl<U> SignInUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AccountConfig>) -> Self {
        Self { user_repo, config }
    }

    pub async fn execute(&self, input: SignInInput) -> AccountResult<SignInOutput> {
        // The login field accepts either a user name or a mobile number
        let user = if let Ok(mobile) = Mobile::new(&input.username) {
            self.user_repo.find_by_mobile(&mobile).await?
        } else {
            let user_name =
                UserName::new(&input.username).map_err(|_| AccountError::InvalidCredentials)?;
            self.user_repo.find_by_user_name(&user_name).await?
        };

        let mut user = user.ok_or(AccountError::InvalidCredentials)?;

        let raw_password =
            RawPassword::new(input.password).map_err(|_| AccountError::InvalidCredentials)?;

        if !user.password_hash.verify(&raw_password, self.config.pepper()) {
            return Err(AccountError::InvalidCredentials);
        }

        user.record_login();
        self.user_repo.update(&user).await?;

        let token = tokens::issue_session(&user, &self.config)?;

        tracing::info!(user_id = %user.user_id, "User signed in");

        Ok(SignInOutput {
            token,
            user_id: user.user_id.into_uuid(),
            username: user.user_name.original().to_string(),
        })
    }
}
