//! Event model, lifecycle status, and capacity derivations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Scheduled => "SCHEDULED",
            EventStatus::Completed => "COMPLETED",
            EventStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SCHEDULED" => Some(EventStatus::Scheduled),
            "COMPLETED" => Some(EventStatus::Completed),
            "CANCELLED" => Some(EventStatus::Cancelled),
            _ => None,
        }
    }
}

/// Event entity
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub department_id: Option<Uuid>,
    pub date: DateTime<Utc>,
    pub location: String,
    pub capacity: i32,
    pub status: EventStatus,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Remaining spots given the current confirmed signup count,
    /// or `None` when capacity is unlimited (capacity == 0).
    pub fn remaining_capacity(&self, confirmed: i64) -> Option<i64> {
        if self.capacity == 0 {
            return None;
        }
        Some((self.capacity as i64 - confirmed).max(0))
    }

    /// Whether the event has reached capacity. Unlimited events are never full.
    pub fn is_full(&self, confirmed: i64) -> bool {
        self.capacity != 0 && confirmed >= self.capacity as i64
    }
}

/// An event together with its recomputed signup counts
#[derive(Debug, Clone, Serialize)]
pub struct EventWithCounts {
    #[serde(flatten)]
    pub event: Event,
    pub confirmed_count: i64,
    pub remaining_capacity: Option<i64>,
    pub is_full: bool,
}

impl EventWithCounts {
    pub fn new(event: Event, confirmed_count: i64) -> Self {
        let remaining_capacity = event.remaining_capacity(confirmed_count);
        let is_full = event.is_full(confirmed_count);
        Self {
            event,
            confirmed_count,
            remaining_capacity,
            is_full,
        }
    }
}

/// Payload for creating or updating an event
#[derive(Debug, Clone, Deserialize)]
pub struct EventRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub department_id: Option<Uuid>,
    pub date: DateTime<Utc>,
    pub location: String,
    #[serde(default)]
    pub capacity: i32,
}

/// Payload for updating an event's lifecycle status
#[derive(Debug, Clone, Deserialize)]
pub struct EventStatusRequest {
    pub status: String,
}

/// Query parameters for the event listing
#[derive(Debug, Clone, Deserialize)]
pub struct EventListQuery {
    /// SCHEDULED (default), COMPLETED, CANCELLED, or ALL
    pub status: Option<String>,
    /// When true, only events created by the requesting user
    pub mine: Option<bool>,
    /// Case-insensitive search over title, description, and location
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// A confirmed participant of an event
#[derive(Debug, Clone, Serialize)]
pub struct Participant {
    pub user_id: Uuid,
    pub username: String,
    pub signed_up_at: DateTime<Utc>,
}

/// Detailed event view: the event, capacity state, the requesting user's
/// signup state, participants, and approved hours logged against it
#[derive(Debug, Serialize)]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: EventWithCounts,
    pub signed: bool,
    pub participants: Vec<Participant>,
    pub approved_hours_by_user: Vec<crate::models::report::VolunteerHours>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_with_capacity(capacity: i32) -> Event {
        Event {
            id: Uuid::new_v4(),
            title: "Park cleanup".into(),
            description: String::new(),
            department_id: None,
            date: Utc::now(),
            location: "Riverside Park".into(),
            capacity,
            status: EventStatus::Scheduled,
            created_by: Uuid::new_v4(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_unlimited_capacity_is_never_full() {
        let event = event_with_capacity(0);
        assert_eq!(event.remaining_capacity(10_000), None);
        assert!(!event.is_full(10_000));
    }

    #[test]
    fn test_remaining_capacity_counts_down() {
        let event = event_with_capacity(2);
        assert_eq!(event.remaining_capacity(0), Some(2));
        assert_eq!(event.remaining_capacity(1), Some(1));
        assert_eq!(event.remaining_capacity(2), Some(0));
        // Over-capacity data never reports negative remaining spots.
        assert_eq!(event.remaining_capacity(3), Some(0));
    }

    #[test]
    fn test_is_full_at_capacity() {
        let event = event_with_capacity(2);
        assert!(!event.is_full(1));
        assert!(event.is_full(2));
        assert!(event.is_full(3));
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            EventStatus::Scheduled,
            EventStatus::Completed,
            EventStatus::Cancelled,
        ] {
            assert_eq!(EventStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(EventStatus::parse("POSTPONED"), None);
    }
}
