//! Contribution endpoints: logging hours, the review queue, and the CSV export

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    models::{
        contribution::{
            ContributionListQuery, ContributionListResponse, ContributionRequest,
            ContributionStatus, ContributionStatusRequest, RejectRequest, truncate_chars,
        },
        page_params,
    },
    state::AppState,
};

const CONTRIBUTIONS_PER_PAGE: u32 = 12;
const EXPORT_DESCRIPTION_LIMIT: usize = 100;

/// Resolve the status query parameter: PENDING is the default,
/// ALL disables the filter.
fn parse_status_filter(status: Option<&str>) -> ApiResult<Option<ContributionStatus>> {
    match status.unwrap_or("PENDING") {
        "ALL" | "" => Ok(None),
        other => ContributionStatus::parse(other)
            .map(Some)
            .ok_or_else(|| ApiError::Validation(format!("Unknown contribution status: {other}"))),
    }
}

/// Resolve the department query parameter: "all" (default) disables the
/// filter, "mine" scopes to the actor's own department, anything else must
/// be a department id.
fn parse_department_filter(department: Option<&str>, actor: &AuthUser) -> ApiResult<Option<Uuid>> {
    match department.unwrap_or("all") {
        "all" | "" => Ok(None),
        "mine" => Ok(actor.department_id),
        other => other
            .parse()
            .map(Some)
            .map_err(|_| ApiError::Validation(format!("Unknown department filter: {other}"))),
    }
}

/// Log volunteer hours
pub async fn create_contribution(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Json(payload): Json<ContributionRequest>,
) -> ApiResult<impl IntoResponse> {
    let contribution = state.contribution_repository.submit(&actor, &payload).await?;

    Ok((StatusCode::CREATED, Json(contribution)))
}

/// Review queue and full log listing (coordinator only)
pub async fn list_contributions(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Query(query): Query<ContributionListQuery>,
) -> ApiResult<impl IntoResponse> {
    actor.require_coordinator()?;

    let status = parse_status_filter(query.status.as_deref())?;
    let department_id = parse_department_filter(query.department.as_deref(), &actor)?;
    let (page, limit, offset) = page_params(query.page, query.limit, CONTRIBUTIONS_PER_PAGE);

    let (items, total) = state
        .contribution_repository
        .list(status, department_id, limit, offset)
        .await?;
    let counts = state.contribution_repository.counts(department_id).await?;

    Ok(Json(ContributionListResponse {
        items,
        page,
        limit,
        total,
        counts,
    }))
}

/// Detailed view of one contribution. Volunteers can only see their own;
/// coordinators can see any.
pub async fn contribution_detail(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let record = state
        .contribution_repository
        .find_record(id)
        .await?
        .ok_or(ApiError::NotFound)?;

    if !actor.is_coordinator && record.user_id != actor.id {
        return Err(ApiError::NotFound);
    }

    Ok(Json(record))
}

/// Approve a pending contribution (coordinator only)
pub async fn approve(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    actor.require_coordinator()?;

    let contribution = state.contribution_repository.approve(id, actor.id).await?;

    Ok(Json(contribution))
}

/// Reject a pending contribution with a reason (coordinator only)
pub async fn reject(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RejectRequest>,
) -> ApiResult<impl IntoResponse> {
    actor.require_coordinator()?;

    let contribution = state
        .contribution_repository
        .reject(id, actor.id, &payload.rejection_reason)
        .await?;

    Ok(Json(contribution))
}

/// Administrative status correction, allowed from any state (coordinator only)
pub async fn update_status(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ContributionStatusRequest>,
) -> ApiResult<impl IntoResponse> {
    actor.require_coordinator()?;

    let status = ContributionStatus::parse(&payload.status).ok_or_else(|| {
        ApiError::Validation(format!("Unknown contribution status: {}", payload.status))
    })?;

    let contribution = state
        .contribution_repository
        .set_status(id, status, actor.id)
        .await?;

    Ok(Json(contribution))
}

/// Export the full contribution log as CSV (coordinator only)
pub async fn export_csv(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    actor.require_coordinator()?;

    let records = state.contribution_repository.export_records().await?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record([
            "User",
            "Event",
            "Department",
            "Date",
            "Hours",
            "Status",
            "Approved By",
            "Approved At",
            "Rejection Reason",
            "Description",
        ])
        .map_err(|e| ApiError::Internal(e.into()))?;

    for record in &records {
        writer
            .write_record([
                record.username.as_str(),
                record.event_title.as_deref().unwrap_or(""),
                record.department_name.as_str(),
                &record.date.to_string(),
                &record.hours.to_string(),
                record.status.as_str(),
                record.approved_by_username.as_deref().unwrap_or(""),
                &record
                    .approved_at
                    .map(|at| at.to_rfc3339())
                    .unwrap_or_default(),
                record.rejection_reason.as_str(),
                &truncate_chars(&record.description, EXPORT_DESCRIPTION_LIMIT),
            ])
            .map_err(|e| ApiError::Internal(e.into()))?;
    }

    let body = writer
        .into_inner()
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("{e}")))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"voluntrack_logs.csv\"",
            ),
        ],
        body,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coordinator(department_id: Option<Uuid>) -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            username: "coord".to_string(),
            is_coordinator: true,
            department_id,
        }
    }

    #[test]
    fn test_parse_status_filter() {
        assert_eq!(
            parse_status_filter(None).unwrap(),
            Some(ContributionStatus::Pending)
        );
        assert_eq!(parse_status_filter(Some("ALL")).unwrap(), None);
        assert_eq!(
            parse_status_filter(Some("REJECTED")).unwrap(),
            Some(ContributionStatus::Rejected)
        );
        assert!(parse_status_filter(Some("DENIED")).is_err());
    }

    #[test]
    fn test_parse_department_filter() {
        let department_id = Uuid::new_v4();
        let actor = coordinator(Some(department_id));

        assert_eq!(parse_department_filter(None, &actor).unwrap(), None);
        assert_eq!(parse_department_filter(Some("all"), &actor).unwrap(), None);
        assert_eq!(
            parse_department_filter(Some("mine"), &actor).unwrap(),
            Some(department_id)
        );
        assert_eq!(
            parse_department_filter(Some(&department_id.to_string()), &actor).unwrap(),
            Some(department_id)
        );
        assert!(parse_department_filter(Some("nonsense"), &actor).is_err());
    }

    #[test]
    fn test_mine_filter_without_department() {
        let actor = coordinator(None);
        assert_eq!(parse_department_filter(Some("mine"), &actor).unwrap(), None);
    }
}
