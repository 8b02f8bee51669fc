//! Sign Up Use Case
//!
//! Registers a new user. The mobile must have been confirmed with an
//! sms verification code, which is consumed by the comparison.

use std::sync::Arc;
use uuid::Uuid;

use platform::cache::TtlStore;
use platform::crypto::constant_time_eq;
use verify::domain::keys;

use crate::application::config::AccountConfig;
use crate::application::tokens;
use crate::domain::entity::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{Mobile, RawPassword, UserName, UserPassword};
use crate::error::{AccountError, AccountResult};

/// Sign up input
pub struct SignUpInput {
    pub username: String,
    pub password: String,
    pub password2: String,
    pub sms_code: String,
    pub mobile: String,
    /// Agreement checkbox, must be the string "true"
    pub allow: String,
}

/// Sign up output
#[derive(Debug)]
pub struct SignUpOutput {
    pub user_id: Uuid,
    pub username: String,
    pub mobile: String,
    pub token: String,
}

/// Sign up use case
pub struct SignUpUseCase<U, S>
where
    U: UserRepository,
    S: TtlStore,
{
    user_repo: Arc<U>,
    store: Arc<S>,
    config: Arc<AccountConfig>,
}

impl<U, S> SignUpUseCase<U, S>
where
    U: UserRepository,
    S: TtlStore,
{
    pub fn new(user_repo: Arc<U>, store: Arc<S>, config: Arc<AccountConfig>) -> Self {
        Self {
            user_repo,
            store,
            config,
        }
    }

    pub async fn execute(&self, input: SignUpInput) -> AccountResult<SignUpOutput> {
        if input.allow != "true" {
            return Err(AccountError::Validation(
                "Please agree to the user agreement".to_string(),
            ));
        }

        if input.password != input.password2 {
            return Err(AccountError::Validation(
                "Passwords do not match".to_string(),
            ));
        }

        let user_name = UserName::new(&input.username)?;
        let mobile = Mobile::new(&input.mobile)?;
        let raw_password = RawPassword::new(input.password)
            .map_err(|e| AccountError::Validation(e.to_string()))?;

        // Availability checks before the code is consumed
        if self.user_repo.find_by_user_name(&user_name).await?.is_some() {
            return Err(AccountError::UserNameTaken);
        }
        if self.user_repo.find_by_mobile(&mobile).await?.is_some() {
            return Err(AccountError::MobileTaken);
        }

        // The comparison consumes the stored code either way
        let stored = self.store.take(&keys::sms_code(&mobile)).await?;
        match stored {
            Some(code) if constant_time_eq(code.as_bytes(), input.sms_code.as_bytes()) => {}
            _ => return Err(AccountError::InvalidSmsCode),
        }

        let password_hash = UserPassword::from_raw(&raw_password, self.config.pepper())
            .map_err(|e| AccountError::Internal(e.to_string()))?;

        let user = User::new(user_name, password_hash, mobile);
        self.user_repo.create(&user).await?;

        let token = tokens::issue_session(&user, &self.config)?;

        tracing::info!(
            user_id = %user.user_id,
            user_name = %user.user_name,
            "User registered"
        );

        Ok(SignUpOutput {
            user_id: user.user_id.into_uuid(),
            username: user.user_name.original().to_string(),
            mobile: user.mobile.as_str().to_string(),
            token,
        })
    }
}
