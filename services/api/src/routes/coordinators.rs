//! Coordinator management: user directory, promote, demote

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use tracing::info;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    models::{Paginated, page_params, user::UserListQuery},
    state::AppState,
};

const USERS_PER_PAGE: u32 = 25;

/// User directory with search and department filter (coordinator only)
pub async fn list_users(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Query(query): Query<UserListQuery>,
) -> ApiResult<impl IntoResponse> {
    actor.require_coordinator()?;

    let (page, limit, offset) = page_params(query.page, query.limit, USERS_PER_PAGE);

    let (items, total) = state
        .user_repository
        .list(query.search.as_deref(), query.department, limit, offset)
        .await?;

    Ok(Json(Paginated {
        items,
        page,
        limit,
        total,
    }))
}

/// Promote a user to coordinator. The promoted user inherits the
/// promoting coordinator's department unless they already have one.
pub async fn promote(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    actor.require_coordinator()?;

    let account = state
        .user_repository
        .set_coordinator(user_id, true, actor.department_id)
        .await?;

    info!("User {} promoted to coordinator by {}", user_id, actor.id);
    Ok(Json(account))
}

/// Demote a coordinator to volunteer. Self-demotion is not allowed.
pub async fn demote(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    actor.require_coordinator()?;

    if user_id == actor.id {
        return Err(ApiError::PermissionDenied);
    }

    let account = state.user_repository.set_coordinator(user_id, false, None).await?;

    info!("User {} demoted to volunteer by {}", user_id, actor.id);
    Ok(Json(account))
}
