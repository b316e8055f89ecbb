//! Reporting endpoint: aggregations over approved contributions

use axum::{
    Extension, Json,
    extract::{Query, State},
    response::IntoResponse,
};

use crate::{
    error::ApiResult,
    middleware::AuthUser,
    models::report::{ReportQuery, ReportResponse},
    state::AppState,
};

const TOP_VOLUNTEERS_LIMIT: i64 = 10;

/// Aggregated reports over approved contributions (coordinator only).
///
/// The optional date range is inclusive on both ends and applies to the
/// contribution date, not the submission time.
pub async fn reports(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Query(query): Query<ReportQuery>,
) -> ApiResult<impl IntoResponse> {
    actor.require_coordinator()?;

    let top_volunteers = state
        .report_repository
        .top_volunteers(query.date_from, query.date_to, TOP_VOLUNTEERS_LIMIT)
        .await?;
    let department_totals = state
        .report_repository
        .department_totals(query.date_from, query.date_to)
        .await?;
    let department_averages = state
        .report_repository
        .department_averages(query.date_from, query.date_to)
        .await?;
    let total_hours = state
        .report_repository
        .total_hours(query.date_from, query.date_to)
        .await?;
    let counts = state.contribution_repository.counts(None).await?;
    let total_contributions = state.report_repository.total_contributions().await?;

    Ok(Json(ReportResponse {
        top_volunteers,
        department_totals,
        department_averages,
        total_hours,
        pending_total: counts.pending,
        total_contributions,
    }))
}
