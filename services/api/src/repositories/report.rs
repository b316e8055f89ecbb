//! Report repository: read-side aggregations over approved contributions
//!
//! Only APPROVED rows count toward any aggregate. All queries accept an
//! optional inclusive date range on the contribution date.

use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::models::report::{DepartmentAverage, DepartmentHours, VolunteerHours, round2};

/// Report repository
#[derive(Clone)]
pub struct ReportRepository {
    pool: PgPool,
}

fn push_date_range(
    qb: &mut QueryBuilder<'_, Postgres>,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
) {
    if let Some(date_from) = date_from {
        qb.push(" AND c.date >= ").push_bind(date_from);
    }
    if let Some(date_to) = date_to {
        qb.push(" AND c.date <= ").push_bind(date_to);
    }
}

impl ReportRepository {
    /// Create a new report repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Top volunteers by total approved hours, ranked
    pub async fn top_volunteers(
        &self,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
        limit: i64,
    ) -> ApiResult<Vec<VolunteerHours>> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            SELECT u.username, SUM(c.hours) AS hours
            FROM contributions c
            JOIN users u ON u.id = c.user_id
            WHERE c.status = 'APPROVED'
            "#,
        );
        push_date_range(&mut qb, date_from, date_to);
        qb.push(" GROUP BY u.username ORDER BY hours DESC LIMIT ")
            .push_bind(limit);

        let rows = qb.build().fetch_all(&self.pool).await?;

        Ok(rows
            .iter()
            .map(|row| VolunteerHours {
                username: row.get("username"),
                hours: round2(row.get("hours")),
            })
            .collect())
    }

    /// Total approved hours per department, highest first
    pub async fn department_totals(
        &self,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> ApiResult<Vec<DepartmentHours>> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            SELECT d.name AS department, SUM(c.hours) AS hours
            FROM contributions c
            JOIN departments d ON d.id = c.department_id
            WHERE c.status = 'APPROVED'
            "#,
        );
        push_date_range(&mut qb, date_from, date_to);
        qb.push(" GROUP BY d.name ORDER BY hours DESC");

        let rows = qb.build().fetch_all(&self.pool).await?;

        Ok(rows
            .iter()
            .map(|row| DepartmentHours {
                department: row.get("department"),
                hours: round2(row.get("hours")),
            })
            .collect())
    }

    /// Average hours per approved contribution, per department
    pub async fn department_averages(
        &self,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> ApiResult<Vec<DepartmentAverage>> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            SELECT d.name AS department, AVG(c.hours) AS avg_hours
            FROM contributions c
            JOIN departments d ON d.id = c.department_id
            WHERE c.status = 'APPROVED'
            "#,
        );
        push_date_range(&mut qb, date_from, date_to);
        qb.push(" GROUP BY d.name ORDER BY avg_hours DESC");

        let rows = qb.build().fetch_all(&self.pool).await?;

        Ok(rows
            .iter()
            .map(|row| DepartmentAverage {
                department: row.get("department"),
                avg_hours: round2(row.get("avg_hours")),
            })
            .collect())
    }

    /// Total approved hours across all users
    pub async fn total_hours(
        &self,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> ApiResult<f64> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT COALESCE(SUM(c.hours), 0) AS hours FROM contributions c WHERE c.status = 'APPROVED'",
        );
        push_date_range(&mut qb, date_from, date_to);

        let row = qb.build().fetch_one(&self.pool).await?;
        Ok(round2(row.get("hours")))
    }

    /// Approved hours per user for one event, highest first
    pub async fn event_hours_by_user(&self, event_id: Uuid) -> ApiResult<Vec<VolunteerHours>> {
        let rows = sqlx::query(
            r#"
            SELECT u.username, SUM(c.hours) AS hours
            FROM contributions c
            JOIN users u ON u.id = c.user_id
            WHERE c.event_id = $1 AND c.status = 'APPROVED'
            GROUP BY u.username
            ORDER BY hours DESC
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| VolunteerHours {
                username: row.get("username"),
                hours: round2(row.get("hours")),
            })
            .collect())
    }

    /// One user's total approved hours
    pub async fn user_total_hours(&self, user_id: Uuid) -> ApiResult<f64> {
        let hours: f64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(hours), 0)
            FROM contributions
            WHERE user_id = $1 AND status = 'APPROVED'
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(round2(hours))
    }

    /// Number of contributions in any state
    pub async fn total_contributions(&self) -> ApiResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contributions")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
