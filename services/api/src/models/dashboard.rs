//! Role-dependent dashboard payloads

use serde::Serialize;

use crate::models::contribution::ContributionRecord;
use crate::models::event::Event;

/// The dashboard response, shaped by the requesting user's role
#[derive(Debug, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum DashboardResponse {
    Coordinator(CoordinatorDashboard),
    Volunteer(VolunteerDashboard),
}

/// Dashboard summary for coordinators
#[derive(Debug, Serialize)]
pub struct CoordinatorDashboard {
    pub pending_count: i64,
    pub total_hours: f64,
    pub total_events: i64,
    pub my_upcoming_events: Vec<Event>,
    pub upcoming_department_events: Vec<Event>,
    pub recent_pending: Vec<ContributionRecord>,
}

/// Dashboard summary for volunteers
#[derive(Debug, Serialize)]
pub struct VolunteerDashboard {
    pub my_hours: f64,
    pub my_pending: Vec<ContributionRecord>,
    pub signed_events: Vec<Event>,
    pub available_events: Vec<Event>,
}
