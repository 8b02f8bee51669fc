//! OAuth Login Use Case
//!
//! Drives the provider handshake: authorization code → provider access
//! token → openid. A known openid yields a session token right away; an
//! unknown one yields a short-lived binding token the client must bring
//! back to complete registration/linking.

use std::sync::Arc;
use uuid::Uuid;

use crate::application::config::AccountConfig;
use crate::application::tokens;
use crate::domain::repository::{IdentityProvider, OAuthBindingRepository, UserRepository};
use crate::error::{AccountError, AccountResult};

/// Outcome of the oauth callback
#[derive(Debug)]
pub enum OAuthLoginOutput {
    /// Identity already bound to a local user
    Bound {
        token: String,
        user_id: Uuid,
        username: String,
    },
    /// Unknown identity; the binding token completes the flow
    Unbound { access_token: String },
}

/// OAuth login use case
pub struct OAuthLoginUseCase<B, U, P>
where
    B: OAuthBindingRepository,
    U: UserRepository,
    P: IdentityProvider,
{
    binding_repo: Arc<B>,
    user_repo: Arc<U>,
    provider: Arc<P>,
    config: Arc<AccountConfig>,
}

impl<B, U, P> OAuthLoginUseCase<B, U, P>
where
    B: OAuthBindingRepository,
    U: UserRepository,
    P: IdentityProvider,
{
    pub fn new(
        binding_repo: Arc<B>,
        user_repo: Arc<U>,
        provider: Arc<P>,
        config: Arc<AccountConfig>,
    ) -> Self {
        Self {
            binding_repo,
            user_repo,
            provider,
            config,
        }
    }

    /// Authorization URL for the client, carrying `next` as state
    pub fn login_url(&self, next: Option<&str>) -> String {
        self.provider.login_url(next.unwrap_or("/"))
    }

    pub async fn execute(&self, code: &str) -> AccountResult<OAuthLoginOutput> {
        let access_token = self.provider.exchange_code(code).await?;
        let openid = self.provider.fetch_openid(&access_token).await?;

        match self.binding_repo.find_by_openid(&openid).await? {
            Some(binding) => {
                let mut user = self
                    .user_repo
                    .find_by_id(&binding.user_id)
                    .await?
                    .ok_or_else(|| {
                        AccountError::Internal("Binding references a missing user".to_string())
                    })?;

                user.record_login();
                self.user_repo.update(&user).await?;

                let token = tokens::issue_session(&user, &self.config)?;

                tracing::info!(user_id = %user.user_id, "OAuth login for bound identity");

                Ok(OAuthLoginOutput::Bound {
                    token,
                    user_id: user.user_id.into_uuid(),
                    username: user.user_name.original().to_string(),
                })
            }
            None => {
                // The openid goes out signed so the client cannot see or
                // forge it.
                let access_token = tokens::issue_binding(&openid, &self.config)?;

                tracing::info!("OAuth identity not bound yet, issued binding token");

                Ok(OAuthLoginOutput::Unbound { access_token })
            }
        }
    }
}
