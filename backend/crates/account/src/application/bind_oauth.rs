//! Bind OAuth Use Case
//!
//! Completes account linking for a first-time oauth identity: verifies
//! the binding token, confirms the mobile with an sms code, then binds
//! the identity to the matching local user or to a freshly created one.

use std::sync::Arc;
use uuid::Uuid;

use platform::cache::TtlStore;
use platform::crypto::constant_time_eq;
use verify::domain::keys;

use crate::application::config::AccountConfig;
use crate::application::tokens;
use crate::domain::entity::{OAuthBinding, User};
use crate::domain::repository::{OAuthBindingRepository, UserRepository};
use crate::domain::value_object::{Mobile, RawPassword, UserName, UserPassword};
use crate::error::{AccountError, AccountResult};

/// Bind oauth input
pub struct BindOAuthInput {
    /// Binding token from the unbound callback answer
    pub access_token: String,
    pub mobile: String,
    pub password: String,
    pub sms_code: String,
}

/// Bind oauth output (same shape as a login)
#[derive(Debug)]
pub struct BindOAuthOutput {
    pub token: String,
    pub user_id: Uuid,
    pub username: String,
}

/// Bind oauth use case
pub struct BindOAuthUseCase<B, U, S>
where
    B: OAuthBindingRepository,
    U: UserRepository,
    S: TtlStore,
{
    binding_repo: Arc<B>,
    user_repo: Arc<U>,
    store: Arc<S>,
    config: Arc<AccountConfig>,
}

impl<B, U, S> BindOAuthUseCase<B, U, S>
where
    B: OAuthBindingRepository,
    U: UserRepository,
    S: TtlStore,
{
    pub fn new(
        binding_repo: Arc<B>,
        user_repo: Arc<U>,
        store: Arc<S>,
        config: Arc<AccountConfig>,
    ) -> Self {
        Self {
            binding_repo,
            user_repo,
            store,
            config,
        }
    }

    pub async fn execute(&self, input: BindOAuthInput) -> AccountResult<BindOAuthOutput> {
        let claims = tokens::verify_binding(&input.access_token, &self.config)?;

        let mobile = Mobile::new(&input.mobile)?;
        let raw_password = RawPassword::new(input.password)
            .map_err(|e| AccountError::Validation(e.to_string()))?;

        // The comparison consumes the stored code either way
        let stored = self.store.take(&keys::sms_code(&mobile)).await?;
        match stored {
            Some(code) if constant_time_eq(code.as_bytes(), input.sms_code.as_bytes()) => {}
            _ => return Err(AccountError::InvalidSmsCode),
        }

        // A binding is immutable; a second attempt for the same identity
        // is a conflict.
        if self.binding_repo.find_by_openid(&claims.openid).await?.is_some() {
            return Err(AccountError::AlreadyBound);
        }

        let mut user = match self.user_repo.find_by_mobile(&mobile).await? {
            Some(user) => {
                // Existing account: the password must check out
                if !user.password_hash.verify(&raw_password, self.config.pepper()) {
                    return Err(AccountError::InvalidCredentials);
                }
                user
            }
            None => {
                // Fresh account; the user name starts out as the mobile
                let user_name = UserName::new(mobile.as_str())?;
                if self.user_repo.find_by_user_name(&user_name).await?.is_some() {
                    return Err(AccountError::UserNameTaken);
                }

                let password_hash = UserPassword::from_raw(&raw_password, self.config.pepper())
                    .map_err(|e| AccountError::Internal(e.to_string()))?;

                let user = User::new(user_name, password_hash, mobile);
                self.user_repo.create(&user).await?;
                user
            }
        };

        let binding = OAuthBinding::new(claims.openid, user.user_id);
        self.binding_repo.create(&binding).await?;

        user.record_login();
        self.user_repo.update(&user).await?;

        let token = tokens::issue_session(&user, &self.config)?;

        tracing::info!(
            user_id = %user.user_id,
            "OAuth identity bound to local user"
        );

        Ok(BindOAuthOutput {
            token,
            user_id: user.user_id.into_uuid(),
            username: user.user_name.original().to_string(),
        })
    }
}
