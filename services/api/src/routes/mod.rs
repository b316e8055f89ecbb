//! API service routes

use axum::{
    Json, Router,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde_json::json;

use crate::{middleware::auth_middleware, state::AppState};

pub mod auth;
pub mod contributions;
pub mod coordinators;
pub mod dashboard;
pub mod departments;
pub mod events;
pub mod reports;
pub mod signups;

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/dashboard", get(dashboard::dashboard))
        .route("/events", get(events::list_events).post(events::create_event))
        .route(
            "/events/:id",
            get(events::event_detail)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route("/events/:id/status", post(events::update_event_status))
        .route("/events/:id/signup", post(signups::event_signup))
        .route("/signups", get(signups::list_signups))
        .route("/signups/:id/cancel", post(signups::cancel_signup))
        .route(
            "/contributions",
            get(contributions::list_contributions).post(contributions::create_contribution),
        )
        .route("/contributions/export", get(contributions::export_csv))
        .route("/contributions/:id", get(contributions::contribution_detail))
        .route("/contributions/:id/approve", post(contributions::approve))
        .route("/contributions/:id/reject", post(contributions::reject))
        .route("/contributions/:id/status", post(contributions::update_status))
        .route("/reports", get(reports::reports))
        .route("/users", get(coordinators::list_users))
        .route("/users/:id/promote", post(coordinators::promote))
        .route("/users/:id/demote", post(coordinators::demote))
        .route(
            "/departments",
            get(departments::list_departments).post(departments::create_department),
        )
        .route(
            "/departments/:id",
            put(departments::rename_department).delete(departments::delete_department),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "voluntrack-api"
    }))
}
