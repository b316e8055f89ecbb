//! Signup endpoints: join an event, list own signups, cancel

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{error::ApiResult, middleware::AuthUser, state::AppState};

/// Sign the authenticated user up for an event
pub async fn event_signup(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(event_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let signup = state.signup_repository.signup(actor.id, event_id).await?;

    Ok((StatusCode::CREATED, Json(signup)))
}

/// The user's confirmed signups for scheduled events
pub async fn list_signups(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let signups = state.signup_repository.list_for_user(actor.id).await?;

    Ok(Json(signups))
}

/// Cancel one of the user's own signups
pub async fn cancel_signup(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(signup_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let signup = state.signup_repository.cancel(signup_id, actor.id).await?;

    Ok(Json(signup))
}
