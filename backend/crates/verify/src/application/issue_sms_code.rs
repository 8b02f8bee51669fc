//! Issue Sms Code Use Case
//!
//! Validates the image code, enforces the per-mobile send interval,
//! stores the fresh code and defers the actual send to the dispatcher.

use std::sync::Arc;

use dispatch::{Dispatcher, Task};
use platform::cache::{CacheEntry, TtlStore};

use crate::application::config::VerifyConfig;
use crate::domain::services::generate_sms_code;
use crate::domain::value_objects::{ImageCodeId, Mobile};
use crate::domain::keys;
use crate::error::{VerifyError, VerifyResult};

/// Input DTO for issue sms code
#[derive(Debug, Clone)]
pub struct IssueSmsCodeInput {
    pub mobile: Mobile,
    pub image_code_id: ImageCodeId,
    pub image_code_text: String,
}

/// Issue Sms Code Use Case
pub struct IssueSmsCodeUseCase<S>
where
    S: TtlStore,
{
    store: Arc<S>,
    dispatcher: Dispatcher,
    config: Arc<VerifyConfig>,
}

impl<S> IssueSmsCodeUseCase<S>
where
    S: TtlStore,
{
    pub fn new(store: Arc<S>, dispatcher: Dispatcher, config: Arc<VerifyConfig>) -> Self {
        Self {
            store,
            dispatcher,
            config,
        }
    }

    pub async fn execute(&self, input: IssueSmsCodeInput) -> VerifyResult<()> {
        // Consume the image code: a comparison uses it up regardless of
        // the outcome.
        let stored = self
            .store
            .take(&keys::image_code(&input.image_code_id))
            .await?;

        let stored = stored.ok_or(VerifyError::InvalidImageCode)?;

        if !stored.eq_ignore_ascii_case(input.image_code_text.trim()) {
            tracing::warn!(
                image_code_id = %input.image_code_id,
                "Image code mismatch"
            );
            return Err(VerifyError::InvalidImageCode);
        }

        // A still-live send flag blocks reissuance
        if self.store.exists(&keys::send_flag(&input.mobile)).await? {
            return Err(VerifyError::RateLimited);
        }

        let sms_code = generate_sms_code(self.config.sms_code_digits);

        // Code and flag go out in one pipelined round-trip
        self.store
            .put_many(&[
                CacheEntry::new(
                    keys::sms_code(&input.mobile),
                    sms_code.clone(),
                    self.config.sms_code_ttl,
                ),
                CacheEntry::new(keys::send_flag(&input.mobile), "1", self.config.send_interval),
            ])
            .await?;

        self.dispatcher.submit(Task::SendSmsCode {
            mobile: input.mobile.as_str().to_string(),
            code: sms_code,
            expires_minutes: self.config.sms_code_ttl_minutes(),
        });

        tracing::info!(
            mobile = %input.mobile.masked(),
            "Issued sms verification code"
        );

        Ok(())
    }
}
