//! Report payloads: read-side aggregations over approved contributions

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Query parameters for the reports view (inclusive date range)
#[derive(Debug, Clone, Deserialize)]
pub struct ReportQuery {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

/// Total approved hours for one volunteer
#[derive(Debug, Clone, Serialize)]
pub struct VolunteerHours {
    pub username: String,
    pub hours: f64,
}

/// Total approved hours for one department
#[derive(Debug, Clone, Serialize)]
pub struct DepartmentHours {
    pub department: String,
    pub hours: f64,
}

/// Average hours per approved contribution for one department
#[derive(Debug, Clone, Serialize)]
pub struct DepartmentAverage {
    pub department: String,
    pub avg_hours: f64,
}

/// The full reports response
#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub top_volunteers: Vec<VolunteerHours>,
    pub department_totals: Vec<DepartmentHours>,
    pub department_averages: Vec<DepartmentAverage>,
    pub total_hours: f64,
    pub pending_total: i64,
    pub total_contributions: i64,
}

/// Round to two decimal places. Hours are stored as f64; reported
/// aggregates are rounded to 2 decimals (so 10h over 3 contributions
/// averages to 3.33).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(10.0 / 3.0), 3.33);
        assert_eq!(round2(2.5), 2.5);
        assert_eq!(round2(0.005), 0.01);
    }
}
