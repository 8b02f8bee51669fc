//! Email Binding Use Cases
//!
//! Attaching an email stores it unverified and mails out a signed
//! verification link through the dispatcher; following the link flips
//! the verified flag, provided the token still matches the address on
//! file.

use std::sync::Arc;
use uuid::Uuid;

use dispatch::{Dispatcher, Task};

use crate::application::config::AccountConfig;
use crate::application::tokens;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{Email, UserId};
use crate::error::{AccountError, AccountResult};

/// Update email input
pub struct UpdateEmailInput {
    pub user_id: Uuid,
    pub email: String,
}

/// Update email output
#[derive(Debug)]
pub struct UpdateEmailOutput {
    /// Normalized address as stored
    pub email: String,
}

/// Update email use case
pub struct UpdateEmailUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    dispatcher: Dispatcher,
    config: Arc<AccountConfig>,
}

impl<U> UpdateEmailUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, dispatcher: Dispatcher, config: Arc<AccountConfig>) -> Self {
        Self {
            user_repo,
            dispatcher,
            config,
        }
    }

    pub async fn execute(&self, input: UpdateEmailInput) -> AccountResult<UpdateEmailOutput> {
        let email = Email::new(&input.email)?;

        let user_id = UserId::from_uuid(input.user_id);
        let mut user = self
            .user_repo
            .find_by_id(&user_id)
            .await?
            .ok_or(AccountError::UserNotFound)?;

        user.set_email(email.clone());
        self.user_repo.update(&user).await?;

        let token = tokens::issue_email_verify(input.user_id, email.as_str(), &self.config)?;
        let verify_url = format!("{}?token={}", self.config.verify_email_base_url, token);

        self.dispatcher.submit(Task::SendVerifyEmail {
            to: email.as_str().to_string(),
            verify_url,
        });

        tracing::info!(user_id = %user.user_id, "Email binding requested");

        Ok(UpdateEmailOutput {
            email: email.as_str().to_string(),
        })
    }
}

/// Verify email use case
pub struct VerifyEmailUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AccountConfig>,
}

impl<U> VerifyEmailUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AccountConfig>) -> Self {
        Self { user_repo, config }
    }

    pub async fn execute(&self, token: &str) -> AccountResult<()> {
        let claims = tokens::verify_email_token(token, &self.config)?;

        let user_id = UserId::from_uuid(claims.user_id);
        let mut user = self
            .user_repo
            .find_by_id(&user_id)
            .await?
            .ok_or(AccountError::InvalidToken)?;

        // The token only verifies the address it was issued for
        match &user.email {
            Some(email) if email.as_str() == claims.email => {}
            _ => return Err(AccountError::InvalidToken),
        }

        user.mark_email_verified();
        self.user_repo.update(&user).await?;

        tracing::info!(user_id = %user.user_id, "Email verified");

        Ok(())
    }
}
