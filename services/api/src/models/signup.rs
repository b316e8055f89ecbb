//! Signup model: the per-user, per-event registration ledger

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::event::EventStatus;

/// Signup status. Rows are never deleted; cancellation flips the status,
/// and a re-signup flips it back on the same logical row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignupStatus {
    Confirmed,
    Cancelled,
}

impl SignupStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignupStatus::Confirmed => "CONFIRMED",
            SignupStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CONFIRMED" => Some(SignupStatus::Confirmed),
            "CANCELLED" => Some(SignupStatus::Cancelled),
            _ => None,
        }
    }
}

/// Signup entity
#[derive(Debug, Clone, Serialize)]
pub struct Signup {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub status: SignupStatus,
    pub created_at: DateTime<Utc>,
}

/// A signup joined with its event, for the "my signups" listing
#[derive(Debug, Clone, Serialize)]
pub struct SignupWithEvent {
    pub id: Uuid,
    pub event_id: Uuid,
    pub event_title: String,
    pub event_date: DateTime<Utc>,
    pub event_location: String,
    pub event_status: EventStatus,
    pub status: SignupStatus,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [SignupStatus::Confirmed, SignupStatus::Cancelled] {
            assert_eq!(SignupStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(SignupStatus::parse("WAITLISTED"), None);
    }
}
