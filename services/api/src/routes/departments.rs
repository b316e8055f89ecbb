//! Department registry endpoints

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    error::ApiResult,
    middleware::AuthUser,
    models::department::DepartmentRequest,
    state::AppState,
};

/// List all departments, alphabetically
pub async fn list_departments(
    State(state): State<AppState>,
) -> ApiResult<impl IntoResponse> {
    let departments = state.department_repository.list().await?;

    Ok(Json(departments))
}

/// Create a department (coordinator only)
pub async fn create_department(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Json(payload): Json<DepartmentRequest>,
) -> ApiResult<impl IntoResponse> {
    actor.require_coordinator()?;

    let department = state.department_repository.create(&payload.name).await?;

    Ok((StatusCode::CREATED, Json(department)))
}

/// Rename a department (coordinator only)
pub async fn rename_department(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<DepartmentRequest>,
) -> ApiResult<impl IntoResponse> {
    actor.require_coordinator()?;

    let department = state.department_repository.rename(id, &payload.name).await?;

    Ok(Json(department))
}

/// Delete a department (coordinator only)
pub async fn delete_department(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    actor.require_coordinator()?;

    state.department_repository.delete(id).await?;

    Ok(Json(serde_json::json!({"message": "Department deleted"})))
}
