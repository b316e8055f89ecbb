//! Event browsing and coordinator event management

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    models::{
        Paginated, page_params,
        event::{EventDetail, EventListQuery, EventRequest, EventStatus, EventStatusRequest},
    },
    state::AppState,
};

const EVENTS_PER_PAGE: u32 = 12;

/// Resolve the status query parameter: SCHEDULED is the default,
/// ALL disables the filter.
fn parse_status_filter(status: Option<&str>) -> ApiResult<Option<EventStatus>> {
    match status.unwrap_or("SCHEDULED") {
        "ALL" | "" => Ok(None),
        other => EventStatus::parse(other)
            .map(Some)
            .ok_or_else(|| ApiError::Validation(format!("Unknown event status: {other}"))),
    }
}

/// List events with filtering, search, and pagination
pub async fn list_events(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Query(query): Query<EventListQuery>,
) -> ApiResult<impl IntoResponse> {
    let status = parse_status_filter(query.status.as_deref())?;
    let created_by = query.mine.unwrap_or(false).then_some(actor.id);
    let (page, limit, offset) = page_params(query.page, query.limit, EVENTS_PER_PAGE);

    let (items, total) = state
        .event_repository
        .list(status, created_by, query.search.as_deref(), limit, offset)
        .await?;

    Ok(Json(Paginated {
        items,
        page,
        limit,
        total,
    }))
}

/// Detailed view of a single event: capacity state, the requesting user's
/// signup state, confirmed participants, and approved hours per user
pub async fn event_detail(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let event = state
        .event_repository
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let signed = state.signup_repository.is_signed_up(actor.id, id).await?;
    let participants = state.signup_repository.participants(id).await?;
    let approved_hours_by_user = state.report_repository.event_hours_by_user(id).await?;

    Ok(Json(EventDetail {
        event,
        signed,
        participants,
        approved_hours_by_user,
    }))
}

/// Create a new event (coordinator only)
pub async fn create_event(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Json(payload): Json<EventRequest>,
) -> ApiResult<impl IntoResponse> {
    actor.require_coordinator()?;

    let event = state.event_repository.create(actor.id, &payload).await?;

    Ok((StatusCode::CREATED, Json(event)))
}

/// Update an event (creating coordinator only)
pub async fn update_event(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<EventRequest>,
) -> ApiResult<impl IntoResponse> {
    actor.require_coordinator()?;

    let event = state.event_repository.update(id, actor.id, &payload).await?;

    Ok(Json(event))
}

/// Delete an event (creating coordinator only)
pub async fn delete_event(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    actor.require_coordinator()?;

    state.event_repository.delete(id, actor.id).await?;

    Ok(Json(serde_json::json!({"message": "Event deleted"})))
}

/// Update event lifecycle status (any coordinator)
pub async fn update_event_status(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<EventStatusRequest>,
) -> ApiResult<impl IntoResponse> {
    actor.require_coordinator()?;

    let status = EventStatus::parse(&payload.status)
        .ok_or_else(|| ApiError::Validation(format!("Unknown event status: {}", payload.status)))?;

    let event = state.event_repository.set_status(id, status).await?;

    Ok(Json(event))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_filter() {
        assert_eq!(parse_status_filter(None).unwrap(), Some(EventStatus::Scheduled));
        assert_eq!(
            parse_status_filter(Some("COMPLETED")).unwrap(),
            Some(EventStatus::Completed)
        );
        assert_eq!(parse_status_filter(Some("ALL")).unwrap(), None);
        assert!(parse_status_filter(Some("bogus")).is_err());
    }
}
