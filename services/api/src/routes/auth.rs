//! Registration, login, and the current-user endpoint

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::info;

use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    models::user::{LoginRequest, RegisterRequest, TokenResponse},
    state::AppState,
    validation::{validate_email, validate_password, validate_username},
};

/// Register a new volunteer account.
///
/// The profile is created together with the account; new users are
/// volunteers until a coordinator promotes them.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_username(&payload.username).map_err(ApiError::Validation)?;
    validate_email(&payload.email).map_err(ApiError::Validation)?;
    validate_password(&payload.password).map_err(ApiError::Validation)?;

    let user = state.user_repository.create(&payload).await?;
    let account = state
        .user_repository
        .find_account(user.id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let access_token = state
        .jwt_service
        .generate_access_token(&user)
        .map_err(ApiError::Internal)?;

    info!("Registered new user: {}", user.username);

    let response = TokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.access_token_expiry(),
        user: account,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    info!("Login attempt for user: {}", payload.username_or_email);

    let user = state
        .user_repository
        .find_by_username_or_email(&payload.username_or_email)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    if !state.user_repository.verify_password(&user, &payload.password)? {
        return Err(ApiError::Unauthorized);
    }

    let account = state
        .user_repository
        .find_account(user.id)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    let access_token = state
        .jwt_service
        .generate_access_token(&user)
        .map_err(ApiError::Internal)?;

    let response = TokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.access_token_expiry(),
        user: account,
    };

    Ok(Json(response))
}

/// The authenticated user's own account
pub async fn me(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let account = state
        .user_repository
        .find_account(actor.id)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(account))
}
