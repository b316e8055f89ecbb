//! Contribution model and the approval state machine payloads

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Approval status of a contribution.
///
/// PENDING is the initial state. APPROVED and REJECTED carry approval
/// metadata (who reviewed it and when); reverting to PENDING clears it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContributionStatus {
    Pending,
    Approved,
    Rejected,
}

impl ContributionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContributionStatus::Pending => "PENDING",
            ContributionStatus::Approved => "APPROVED",
            ContributionStatus::Rejected => "REJECTED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(ContributionStatus::Pending),
            "APPROVED" => Some(ContributionStatus::Approved),
            "REJECTED" => Some(ContributionStatus::Rejected),
            _ => None,
        }
    }
}

/// Contribution entity
#[derive(Debug, Clone, Serialize)]
pub struct Contribution {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Option<Uuid>,
    pub department_id: Uuid,
    pub date: NaiveDate,
    pub hours: f64,
    pub description: String,
    pub status: ContributionStatus,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejection_reason: String,
    pub created_at: DateTime<Utc>,
}

/// A contribution joined with the names a reviewer needs to see
#[derive(Debug, Clone, Serialize)]
pub struct ContributionRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub event_id: Option<Uuid>,
    pub event_title: Option<String>,
    pub department_id: Uuid,
    pub department_name: String,
    pub date: NaiveDate,
    pub hours: f64,
    pub description: String,
    pub status: ContributionStatus,
    pub approved_by: Option<Uuid>,
    pub approved_by_username: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejection_reason: String,
    pub created_at: DateTime<Utc>,
}

/// Payload for logging volunteer hours
#[derive(Debug, Clone, Deserialize)]
pub struct ContributionRequest {
    pub event_id: Option<Uuid>,
    pub department_id: Uuid,
    pub date: NaiveDate,
    pub hours: f64,
    #[serde(default)]
    pub description: String,
}

/// Payload for rejecting a contribution
#[derive(Debug, Clone, Deserialize)]
pub struct RejectRequest {
    #[serde(default)]
    pub rejection_reason: String,
}

/// Payload for the administrative status correction
#[derive(Debug, Clone, Deserialize)]
pub struct ContributionStatusRequest {
    pub status: String,
}

/// Query parameters for the contribution listing
#[derive(Debug, Clone, Deserialize)]
pub struct ContributionListQuery {
    /// PENDING (default), APPROVED, REJECTED, or ALL
    pub status: Option<String>,
    /// "all" (default), "mine" (the reviewer's own department), or a department id
    pub department: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Per-status counts shown alongside the review queue
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StatusCounts {
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
}

/// Listing response for the review queue and the full log
#[derive(Debug, Serialize)]
pub struct ContributionListResponse {
    pub items: Vec<ContributionRecord>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub counts: StatusCounts,
}

/// Truncate a string to at most `max` characters, respecting char boundaries.
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            ContributionStatus::Pending,
            ContributionStatus::Approved,
            ContributionStatus::Rejected,
        ] {
            assert_eq!(ContributionStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ContributionStatus::parse("DENIED"), None);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("short", 100), "short");
        let long = "x".repeat(250);
        assert_eq!(truncate_chars(&long, 100).chars().count(), 100);
        // Multi-byte characters are counted as single characters.
        let accented = "é".repeat(150);
        assert_eq!(truncate_chars(&accented, 100).chars().count(), 100);
    }
}
