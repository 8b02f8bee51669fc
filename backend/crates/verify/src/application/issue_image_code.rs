//! Issue Image Code Use Case

use std::sync::Arc;

use platform::cache::TtlStore;

use crate::application::config::VerifyConfig;
use crate::domain::services::generate_image_code;
use crate::domain::value_objects::ImageCodeId;
use crate::domain::keys;
use crate::error::{VerifyError, VerifyResult};

/// Output DTO for issue image code
#[derive(Debug, Clone)]
pub struct IssueImageCodeOutput {
    /// Rendered captcha image
    pub image_png: Vec<u8>,
}

/// Issue Image Code Use Case
pub struct IssueImageCodeUseCase<S>
where
    S: TtlStore,
{
    store: Arc<S>,
    config: Arc<VerifyConfig>,
}

impl<S> IssueImageCodeUseCase<S>
where
    S: TtlStore,
{
    pub fn new(store: Arc<S>, config: Arc<VerifyConfig>) -> Self {
        Self { store, config }
    }

    pub async fn execute(&self, image_code_id: ImageCodeId) -> VerifyResult<IssueImageCodeOutput> {
        let (text, image_png) = generate_image_code(self.config.image_code_chars)
            .ok_or(VerifyError::CaptchaRender)?;

        self.store
            .put(
                &keys::image_code(&image_code_id),
                &text,
                self.config.image_code_ttl,
            )
            .await?;

        tracing::info!(
            image_code_id = %image_code_id,
            "Issued image verification code"
        );

        Ok(IssueImageCodeOutput { image_png })
    }
}
