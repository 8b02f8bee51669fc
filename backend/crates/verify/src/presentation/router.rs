//! Verify Router

use axum::{Router, routing::get};
use std::sync::Arc;

use dispatch::Dispatcher;
use platform::cache::TtlStore;

use crate::application::config::VerifyConfig;
use crate::presentation::handlers::{self, VerifyAppState};

/// Create the verify router for any TTL store implementation
pub fn verify_router<S>(store: S, dispatcher: Dispatcher, config: VerifyConfig) -> Router
where
    S: TtlStore + Clone + Send + Sync + 'static,
{
    let state = VerifyAppState {
        store: Arc::new(store),
        dispatcher,
        config: Arc::new(config),
    };

    Router::new()
        .route(
            "/image_codes/{image_code_id}",
            get(handlers::issue_image_code::<S>),
        )
        .route("/sms_codes/{mobile}", get(handlers::issue_sms_code::<S>))
        .with_state(state)
}
