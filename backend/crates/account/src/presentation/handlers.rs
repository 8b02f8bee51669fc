//! HTTP Handlers

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use std::sync::Arc;
use uuid::Uuid;

use dispatch::Dispatcher;
use platform::cache::TtlStore;

use crate::application::config::AccountConfig;
use crate::application::{
    AddressInput, AddressesUseCase, BindOAuthInput, BindOAuthUseCase, OAuthLoginOutput,
    OAuthLoginUseCase, SignInInput, SignInUseCase, SignUpInput, SignUpUseCase, UpdateEmailInput,
    UpdateEmailUseCase, VerifyEmailUseCase,
};
use crate::domain::repository::{
    AddressRepository, IdentityProvider, OAuthBindingRepository, UserRepository,
};
use crate::domain::value_object::UserId;
use crate::error::{AccountError, AccountResult};
use crate::presentation::dto::{
    AddressListResponse, AddressRequest, AddressResponse, AddressTitleRequest, AuthorizationQuery,
    BindOAuthRequest, BindingTokenResponse, EmailRequest, EmailResponse, LoginRequest,
    LoginResponse, LoginUrlResponse, MessageResponse, MobileCountResponse, OAuthCallbackQuery,
    RegisterRequest, RegisterResponse, UserDetailResponse, UsernameCountResponse,
    VerifyEmailQuery,
};
use crate::presentation::middleware::CurrentUser;

/// Shared state for account handlers
#[derive(Clone)]
pub struct AccountAppState<R, S, P>
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
    pub repo: Arc<R>,
    pub store: Arc<S>,
    pub provider: Arc<P>,
    pub dispatcher: Dispatcher,
    pub config: Arc<AccountConfig>,
}

// ============================================================================
// Registration
// ============================================================================

/// POST /api/users
pub async fn register<R, S, P>(
    State(state): State<AccountAppState<R, S, P>>,
    Json(req): Json<RegisterRequest>,
) -> AccountResult<Json<RegisterResponse>>
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
    let use_case =
        SignUpUseCase::new(state.repo.clone(), state.store.clone(), state.config.clone());

    let input = SignUpInput {
        username: req.username,
        password: req.password,
        password2: req.password2,
        sms_code: req.sms_code,
        mobile: req.mobile,
        allow: req.allow,
    };

    let output = use_case.execute(input).await?;

    Ok(Json(RegisterResponse {
        id: output.user_id,
        username: output.username,
        mobile: output.mobile,
        token: output.token,
    }))
}

/// GET /api/users/usernames/{username}/count
pub async fn username_count<R, S, P>(
    State(state): State<AccountAppState<R, S, P>>,
    Path(username): Path<String>,
) -> AccountResult<Json<UsernameCountResponse>>
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
    let count = state.repo.count_by_user_name(&username).await?;

    Ok(Json(UsernameCountResponse { username, count }))
}

/// GET /api/users/mobiles/{mobile}/count
pub async fn mobile_count<R, S, P>(
    State(state): State<AccountAppState<R, S, P>>,
    Path(mobile): Path<String>,
) -> AccountResult<Json<MobileCountResponse>>
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
    let count = state.repo.count_by_mobile(&mobile).await?;

    Ok(Json(MobileCountResponse { mobile, count }))
}

// ============================================================================
// Login
// ============================================================================

/// POST /api/authorizations
pub async fn login<R, S, P>(
    State(state): State<AccountAppState<R, S, P>>,
    Json(req): Json<LoginRequest>,
) -> AccountResult<Json<LoginResponse>>
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
    let use_case = SignInUseCase::new(state.repo.clone(), state.config.clone());

    let input = SignInInput {
        username: req.username,
        password: req.password,
    };

    let output = use_case.execute(input).await?;

    Ok(Json(LoginResponse {
        token: output.token,
        user_id: output.user_id,
        username: output.username,
    }))
}

// ============================================================================
// Profile
// ============================================================================

/// GET /api/users/detail
pub async fn user_detail<R, S, P>(
    State(state): State<AccountAppState<R, S, P>>,
    Extension(current): Extension<CurrentUser>,
) -> AccountResult<Json<UserDetailResponse>>
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
    let user_id = UserId::from_uuid(current.user_id);
    let user = UserRepository::find_by_id(state.repo.as_ref(), &user_id)
        .await?
        .ok_or(AccountError::UserNotFound)?;

    Ok(Json(UserDetailResponse {
        id: user.user_id.into_uuid(),
        username: user.user_name.original().to_string(),
        mobile: user.mobile.as_str().to_string(),
        email: user.email.as_ref().map(|e| e.as_str().to_string()),
        email_active: user.email_verified,
    }))
}

/// PUT /api/users/email
pub async fn update_email<R, S, P>(
    State(state): State<AccountAppState<R, S, P>>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<EmailRequest>,
) -> AccountResult<Json<EmailResponse>>
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
    let use_case = UpdateEmailUseCase::new(
        state.repo.clone(),
        state.dispatcher.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(UpdateEmailInput {
            user_id: current.user_id,
            email: req.email,
        })
        .await?;

    Ok(Json(EmailResponse {
        id: current.user_id,
        email: output.email,
    }))
}

/// GET /api/users/email/verification?token=..
pub async fn verify_email<R, S, P>(
    State(state): State<AccountAppState<R, S, P>>,
    Query(query): Query<VerifyEmailQuery>,
) -> AccountResult<Json<MessageResponse>>
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
    let token = query
        .token
        .ok_or_else(|| AccountError::Validation("Missing token".to_string()))?;

    let use_case = VerifyEmailUseCase::new(state.repo.clone(), state.config.clone());
    use_case.execute(&token).await?;

    Ok(Json(MessageResponse::ok()))
}

// ============================================================================
// OAuth
// ============================================================================

/// GET /api/oauth/qq/authorization?next=..
pub async fn qq_login_url<R, S, P>(
    State(state): State<AccountAppState<R, S, P>>,
    Query(query): Query<AuthorizationQuery>,
) -> AccountResult<Json<LoginUrlResponse>>
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
    let use_case = OAuthLoginUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.provider.clone(),
        state.config.clone(),
    );

    Ok(Json(LoginUrlResponse {
        login_url: use_case.login_url(query.next.as_deref()),
    }))
}

/// GET /api/oauth/qq/user?code=..
pub async fn qq_callback<R, S, P>(
    State(state): State<AccountAppState<R, S, P>>,
    Query(query): Query<OAuthCallbackQuery>,
) -> AccountResult<impl IntoResponse>
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
    let code = query
        .code
        .ok_or_else(|| AccountError::Validation("Missing code".to_string()))?;

    let use_case = OAuthLoginUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.provider.clone(),
        state.config.clone(),
    );

    match use_case.execute(&code).await? {
        OAuthLoginOutput::Bound {
            token,
            user_id,
            username,
        } => Ok(Json(LoginResponse {
            token,
            user_id,
            username,
        })
        .into_response()),
        OAuthLoginOutput::Unbound { access_token } => {
            Ok(Json(BindingTokenResponse { access_token }).into_response())
        }
    }
}

/// POST /api/oauth/qq/user
pub async fn qq_bind<R, S, P>(
    State(state): State<AccountAppState<R, S, P>>,
    Json(req): Json<BindOAuthRequest>,
) -> AccountResult<Json<LoginResponse>>
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
    let use_case = BindOAuthUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.store.clone(),
        state.config.clone(),
    );

    let input = BindOAuthInput {
        access_token: req.access_token,
        mobile: req.mobile,
        password: req.password,
        sms_code: req.sms_code,
    };

    let output = use_case.execute(input).await?;

    Ok(Json(LoginResponse {
        token: output.token,
        user_id: output.user_id,
        username: output.username,
    }))
}

// ============================================================================
// Addresses
// ============================================================================

fn address_use_case<R, S, P>(state: &AccountAppState<R, S, P>) -> AddressesUseCase<R, R>
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
    AddressesUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone())
}

fn address_input(req: AddressRequest) -> AddressInput {
    AddressInput {
        title: req.title,
        receiver: req.receiver,
        province: req.province,
        city: req.city,
        district: req.district,
        place: req.place,
        mobile: req.mobile,
        tel: req.tel,
        email: req.email,
    }
}

/// GET /api/addresses
pub async fn list_addresses<R, S, P>(
    State(state): State<AccountAppState<R, S, P>>,
    Extension(current): Extension<CurrentUser>,
) -> AccountResult<Json<AddressListResponse>>
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
    let output = address_use_case(&state).list(current.user_id).await?;

    Ok(Json(AddressListResponse {
        user_id: output.user_id,
        default_address_id: output.default_address_id,
        limit: output.limit,
        addresses: output.addresses.iter().map(AddressResponse::from).collect(),
    }))
}

/// POST /api/addresses
pub async fn create_address<R, S, P>(
    State(state): State<AccountAppState<R, S, P>>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<AddressRequest>,
) -> AccountResult<impl IntoResponse>
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
    let address = address_use_case(&state)
        .create(current.user_id, address_input(req))
        .await?;

    Ok((StatusCode::CREATED, Json(AddressResponse::from(&address))))
}

/// PUT /api/addresses/{address_id}
pub async fn update_address<R, S, P>(
    State(state): State<AccountAppState<R, S, P>>,
    Extension(current): Extension<CurrentUser>,
    Path(address_id): Path<Uuid>,
    Json(req): Json<AddressRequest>,
) -> AccountResult<Json<AddressResponse>>
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
    let address = address_use_case(&state)
        .update(current.user_id, address_id, address_input(req))
        .await?;

    Ok(Json(AddressResponse::from(&address)))
}

/// DELETE /api/addresses/{address_id}
pub async fn remove_address<R, S, P>(
    State(state): State<AccountAppState<R, S, P>>,
    Extension(current): Extension<CurrentUser>,
    Path(address_id): Path<Uuid>,
) -> AccountResult<StatusCode>
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
    address_use_case(&state)
        .remove(current.user_id, address_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/addresses/{address_id}/status
pub async fn set_default_address<R, S, P>(
    State(state): State<AccountAppState<R, S, P>>,
    Extension(current): Extension<CurrentUser>,
    Path(address_id): Path<Uuid>,
) -> AccountResult<Json<MessageResponse>>
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
    address_use_case(&state)
        .set_default(current.user_id, address_id)
        .await?;

    Ok(Json(MessageResponse::ok()))
}

/// PUT /api/addresses/{address_id}/title
pub async fn set_address_title<R, S, P>(
    State(state): State<AccountAppState<R, S, P>>,
    Extension(current): Extension<CurrentUser>,
    Path(address_id): Path<Uuid>,
    Json(req): Json<AddressTitleRequest>,
) -> AccountResult<Json<AddressResponse>>
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
    let address = address_use_case(&state)
        .set_title(current.user_id, address_id, req.title)
        .await?;

    Ok(Json(AddressResponse::from(&address)))
}
