//! Account Router

use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;

use dispatch::Dispatcher;
use platform::cache::{RedisTtlStore, TtlStore};

use crate::application::config::AccountConfig;
use crate::domain::repository::{
    AddressRepository, IdentityProvider, OAuthBindingRepository, UserRepository,
};
use crate::infra::postgres::PgAccountRepository;
use crate::infra::qq::QqProvider;
use crate::presentation::handlers::{self, AccountAppState};
use crate::presentation::middleware;

/// Create the account router with the production implementations
pub fn account_router(
    repo: PgAccountRepository,
    store: RedisTtlStore,
    provider: QqProvider,
    dispatcher: Dispatcher,
    config: AccountConfig,
) -> Router {
    account_router_generic(repo, store, provider, dispatcher, config)
}

/// Create a generic account router for any implementation set
pub fn account_router_generic<R, S, P>(
    repo: R,
    store: S,
    provider: P,
    dispatcher: Dispatcher,
    config: AccountConfig,
) -> Router
where
    R: UserRepository
        + AddressRepository
        + OAuthBindingRepository
        + Clone
        + Send
        + Sync
        + 'static,
    S: TtlStore + Clone + Send + Sync + 'static,
    P: IdentityProvider + Clone + Send + Sync + 'static,
{
    let config = Arc::new(config);
    let state = AccountAppState {
        repo: Arc::new(repo),
        store: Arc::new(store),
        provider: Arc::new(provider),
        dispatcher,
        config: config.clone(),
    };

    let protected = Router::new()
        .route("/users/detail", get(handlers::user_detail::<R, S, P>))
        .route("/users/email", put(handlers::update_email::<R, S, P>))
        .route(
            "/addresses",
            get(handlers::list_addresses::<R, S, P>).post(handlers::create_address::<R, S, P>),
        )
        .route(
            "/addresses/{address_id}",
            put(handlers::update_address::<R, S, P>).delete(handlers::remove_address::<R, S, P>),
        )
        .route(
            "/addresses/{address_id}/status",
            put(handlers::set_default_address::<R, S, P>),
        )
        .route(
            "/addresses/{address_id}/title",
            put(handlers::set_address_title::<R, S, P>),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            config,
            middleware::require_session,
        ));

    Router::new()
        .route("/users", post(handlers::register::<R, S, P>))
        .route(
            "/users/usernames/{username}/count",
            get(handlers::username_count::<R, S, P>),
        )
        .route(
            "/users/mobiles/{mobile}/count",
            get(handlers::mobile_count::<R, S, P>),
        )
        .route(
            "/users/email/verification",
            get(handlers::verify_email::<R, S, P>),
        )
        .route("/authorizations", post(handlers::login::<R, S, P>))
        .route(
            "/oauth/qq/authorization",
            get(handlers::qq_login_url::<R, S, P>),
        )
        .route(
            "/oauth/qq/user",
            get(handlers::qq_callback::<R, S, P>).post(handlers::qq_bind::<R, S, P>),
        )
        .merge(protected)
        .with_state(state)
}
