//! Role-dependent dashboard endpoint

use axum::{Extension, Json, extract::State, response::IntoResponse};

use crate::{
    error::ApiResult,
    middleware::AuthUser,
    models::dashboard::{CoordinatorDashboard, DashboardResponse, VolunteerDashboard},
    state::AppState,
};

const DASHBOARD_LIST_LIMIT: i64 = 5;

/// Dashboard summary. Coordinators see the review queue and their own
/// events; volunteers see their hours and signup options.
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let response = if actor.is_coordinator {
        let counts = state.contribution_repository.counts(None).await?;
        let total_hours = state.report_repository.total_hours(None, None).await?;
        let total_events = state.event_repository.count_created_by(actor.id).await?;
        let my_upcoming_events = state
            .event_repository
            .upcoming_created_by(actor.id, DASHBOARD_LIST_LIMIT)
            .await?;
        let upcoming_department_events = state
            .event_repository
            .upcoming(actor.department_id, DASHBOARD_LIST_LIMIT)
            .await?;
        let recent_pending = state
            .contribution_repository
            .recent_pending(DASHBOARD_LIST_LIMIT)
            .await?;

        DashboardResponse::Coordinator(CoordinatorDashboard {
            pending_count: counts.pending,
            total_hours,
            total_events,
            my_upcoming_events,
            upcoming_department_events,
            recent_pending,
        })
    } else {
        let my_hours = state.report_repository.user_total_hours(actor.id).await?;
        let my_pending = state
            .contribution_repository
            .recent_pending_for_user(actor.id, DASHBOARD_LIST_LIMIT)
            .await?;
        let signed_events = state.event_repository.signed_for_user(actor.id).await?;
        let available_events = state.event_repository.available_for_user(actor.id).await?;

        DashboardResponse::Volunteer(VolunteerDashboard {
            my_hours,
            my_pending,
            signed_events,
            available_events,
        })
    };

    Ok(Json(response))
}
