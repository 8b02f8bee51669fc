//! HTTP Handlers

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use std::sync::Arc;

use dispatch::Dispatcher;
use platform::cache::TtlStore;

use crate::application::config::VerifyConfig;
use crate::application::{IssueImageCodeUseCase, IssueSmsCodeInput, IssueSmsCodeUseCase};
use crate::domain::value_objects::{ImageCodeId, Mobile};
use crate::error::VerifyResult;
use crate::presentation::dto::{MessageResponse, SmsCodeQuery};

/// Shared state for verify handlers
#[derive(Clone)]
pub struct VerifyAppState<S>
where
    S: TtlStore + Clone + Send + Sync + 'static,
{
    pub store: Arc<S>,
    pub dispatcher: Dispatcher,
    pub config: Arc<VerifyConfig>,
}

/// GET /api/verify/image_codes/{image_code_id}
pub async fn issue_image_code<S>(
    State(state): State<VerifyAppState<S>>,
    Path(image_code_id): Path<String>,
) -> VerifyResult<impl IntoResponse>
where
    S: TtlStore + Clone + Send + Sync + 'static,
{
    let image_code_id = ImageCodeId::new(&image_code_id)?;

    let use_case = IssueImageCodeUseCase::new(state.store.clone(), state.config.clone());

    let output = use_case.execute(image_code_id).await?;

    Ok((
        [(header::CONTENT_TYPE, "image/png")],
        output.image_png,
    ))
}

/// GET /api/verify/sms_codes/{mobile}?image_code_id=..&text=..
pub async fn issue_sms_code<S>(
    State(state): State<VerifyAppState<S>>,
    Path(mobile): Path<String>,
    Query(query): Query<SmsCodeQuery>,
) -> VerifyResult<Json<MessageResponse>>
where
    S: TtlStore + Clone + Send + Sync + 'static,
{
    let input = IssueSmsCodeInput {
        mobile: Mobile::new(&mobile)?,
        image_code_id: ImageCodeId::new(&query.image_code_id)?,
        image_code_text: query.text,
    };

    let use_case = IssueSmsCodeUseCase::new(
        state.store.clone(),
        state.dispatcher.clone(),
        state.config.clone(),
    );

    use_case.execute(input).await?;

    Ok(Json(MessageResponse::ok()))
}
