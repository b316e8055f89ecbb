//! Contribution repository: hours claims and the approval state machine
//!
//! PENDING is the initial state; approve/reject are single conditional
//! updates guarded on PENDING, so a second review attempt fails instead of
//! silently overwriting the first. The administrative `set_status` path can
//! move between any two states and keeps the approval-metadata invariant:
//! a PENDING row never carries a reviewer or review timestamp.

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::models::contribution::{
    Contribution, ContributionRecord, ContributionRequest, ContributionStatus, StatusCounts,
};
use crate::validation::validate_hours;

/// Contribution repository
#[derive(Clone)]
pub struct ContributionRepository {
    pool: PgPool,
}

fn parse_status(status: &str) -> ApiResult<ContributionStatus> {
    ContributionStatus::parse(status)
        .ok_or_else(|| anyhow::anyhow!("Unexpected contribution status in database: {status}").into())
}

fn contribution_from_row(row: &PgRow) -> ApiResult<Contribution> {
    let status: String = row.get("status");

    Ok(Contribution {
        id: row.get("id"),
        user_id: row.get("user_id"),
        event_id: row.get("event_id"),
        department_id: row.get("department_id"),
        date: row.get("date"),
        hours: row.get("hours"),
        description: row.get("description"),
        status: parse_status(&status)?,
        approved_by: row.get("approved_by"),
        approved_at: row.get("approved_at"),
        rejection_reason: row.get("rejection_reason"),
        created_at: row.get("created_at"),
    })
}

fn record_from_row(row: &PgRow) -> ApiResult<ContributionRecord> {
    let status: String = row.get("status");

    Ok(ContributionRecord {
        id: row.get("id"),
        user_id: row.get("user_id"),
        username: row.get("username"),
        event_id: row.get("event_id"),
        event_title: row.get("event_title"),
        department_id: row.get("department_id"),
        department_name: row.get("department_name"),
        date: row.get("date"),
        hours: row.get("hours"),
        description: row.get("description"),
        status: parse_status(&status)?,
        approved_by: row.get("approved_by"),
        approved_by_username: row.get("approved_by_username"),
        approved_at: row.get("approved_at"),
        rejection_reason: row.get("rejection_reason"),
        created_at: row.get("created_at"),
    })
}

const CONTRIBUTION_COLUMNS: &str =
    "id, user_id, event_id, department_id, date, hours, description, \
     status, approved_by, approved_at, rejection_reason, created_at";

const RECORD_SELECT: &str = r#"
    SELECT c.id, c.user_id, u.username, c.event_id, e.title AS event_title,
           c.department_id, d.name AS department_name, c.date, c.hours,
           c.description, c.status, c.approved_by,
           a.username AS approved_by_username, c.approved_at,
           c.rejection_reason, c.created_at
    FROM contributions c
    JOIN users u ON u.id = c.user_id
    JOIN departments d ON d.id = c.department_id
    LEFT JOIN events e ON e.id = c.event_id
    LEFT JOIN users a ON a.id = c.approved_by
"#;

impl ContributionRepository {
    /// Create a new contribution repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Log volunteer hours. Always created in PENDING state.
    ///
    /// When the claim references an event, the event must be scheduled, and
    /// non-coordinators must hold a confirmed signup for it.
    pub async fn submit(&self, actor: &AuthUser, request: &ContributionRequest) -> ApiResult<Contribution> {
        validate_hours(request.hours).map_err(ApiError::Validation)?;

        let department_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM departments WHERE id = $1)")
                .bind(request.department_id)
                .fetch_one(&self.pool)
                .await?;
        if !department_exists {
            return Err(ApiError::Validation("Unknown department".into()));
        }

        if let Some(event_id) = request.event_id {
            let event_status: Option<String> =
                sqlx::query_scalar("SELECT status FROM events WHERE id = $1")
                    .bind(event_id)
                    .fetch_optional(&self.pool)
                    .await?;
            let event_status = event_status.ok_or(ApiError::NotFound)?;

            if event_status != "SCHEDULED" {
                return Err(ApiError::EventNotScheduled);
            }

            if !actor.is_coordinator {
                let signed_up: bool = sqlx::query_scalar(
                    r#"
                    SELECT EXISTS(
                        SELECT 1 FROM signups
                        WHERE user_id = $1 AND event_id = $2 AND status = 'CONFIRMED'
                    )
                    "#,
                )
                .bind(actor.id)
                .bind(event_id)
                .fetch_one(&self.pool)
                .await?;

                if !signed_up {
                    return Err(ApiError::NotSignedUp);
                }
            }
        }

        let sql = format!(
            "INSERT INTO contributions (user_id, event_id, department_id, date, hours, description) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {CONTRIBUTION_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(actor.id)
            .bind(request.event_id)
            .bind(request.department_id)
            .bind(request.date)
            .bind(request.hours)
            .bind(&request.description)
            .fetch_one(&self.pool)
            .await?;

        info!("User {} submitted {} hours for approval", actor.id, request.hours);
        contribution_from_row(&row)
    }

    /// Approve a pending contribution, stamping reviewer and review time.
    ///
    /// The update is guarded on PENDING: a contribution that was already
    /// reviewed fails with `InvalidState`, so approving twice succeeds once.
    pub async fn approve(&self, id: Uuid, coordinator_id: Uuid) -> ApiResult<Contribution> {
        let sql = format!(
            "UPDATE contributions \
             SET status = 'APPROVED', approved_by = $2, approved_at = now() \
             WHERE id = $1 AND status = 'PENDING' \
             RETURNING {CONTRIBUTION_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(coordinator_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                info!("Contribution {} approved by {}", id, coordinator_id);
                contribution_from_row(&row)
            }
            None => Err(self.review_failure(id).await?),
        }
    }

    /// Reject a pending contribution, storing the reason verbatim
    pub async fn reject(&self, id: Uuid, coordinator_id: Uuid, reason: &str) -> ApiResult<Contribution> {
        let sql = format!(
            "UPDATE contributions \
             SET status = 'REJECTED', approved_by = $2, approved_at = now(), rejection_reason = $3 \
             WHERE id = $1 AND status = 'PENDING' \
             RETURNING {CONTRIBUTION_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(coordinator_id)
            .bind(reason)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                info!("Contribution {} rejected by {}", id, coordinator_id);
                contribution_from_row(&row)
            }
            None => Err(self.review_failure(id).await?),
        }
    }

    /// Distinguish a missing contribution from one outside PENDING
    async fn review_failure(&self, id: Uuid) -> ApiResult<ApiError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM contributions WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        if exists {
            Ok(ApiError::InvalidState(
                "Only pending contributions can be reviewed".into(),
            ))
        } else {
            Ok(ApiError::NotFound)
        }
    }

    /// Administrative status correction, allowed from any state.
    ///
    /// Moving PENDING to a reviewed state stamps the reviewer metadata;
    /// moving to PENDING clears reviewer, review time, and rejection reason.
    /// A direct APPROVED/REJECTED swap keeps the original review metadata.
    pub async fn set_status(
        &self,
        id: Uuid,
        new_status: ContributionStatus,
        actor_id: Uuid,
    ) -> ApiResult<Contribution> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {CONTRIBUTION_COLUMNS} FROM contributions WHERE id = $1 FOR UPDATE");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let current = row.as_ref().map(contribution_from_row).transpose()?.ok_or(ApiError::NotFound)?;

        let row = match (current.status, new_status) {
            (ContributionStatus::Pending, ContributionStatus::Approved)
            | (ContributionStatus::Pending, ContributionStatus::Rejected) => {
                let sql = format!(
                    "UPDATE contributions \
                     SET status = $2, approved_by = $3, approved_at = now() \
                     WHERE id = $1 RETURNING {CONTRIBUTION_COLUMNS}"
                );
                sqlx::query(&sql)
                    .bind(id)
                    .bind(new_status.as_str())
                    .bind(actor_id)
                    .fetch_one(&mut *tx)
                    .await?
            }
            (_, ContributionStatus::Pending) => {
                let sql = format!(
                    "UPDATE contributions \
                     SET status = 'PENDING', approved_by = NULL, approved_at = NULL, \
                         rejection_reason = '' \
                     WHERE id = $1 RETURNING {CONTRIBUTION_COLUMNS}"
                );
                sqlx::query(&sql).bind(id).fetch_one(&mut *tx).await?
            }
            _ => {
                let sql = format!(
                    "UPDATE contributions SET status = $2 \
                     WHERE id = $1 RETURNING {CONTRIBUTION_COLUMNS}"
                );
                sqlx::query(&sql)
                    .bind(id)
                    .bind(new_status.as_str())
                    .fetch_one(&mut *tx)
                    .await?
            }
        };

        tx.commit().await?;

        info!("Contribution {} status set to {} by {}", id, new_status.as_str(), actor_id);
        contribution_from_row(&row)
    }

    /// Detailed view of one contribution for review
    pub async fn find_record(&self, id: Uuid) -> ApiResult<Option<ContributionRecord>> {
        let sql = format!("{RECORD_SELECT} WHERE c.id = $1");
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;

        row.as_ref().map(record_from_row).transpose()
    }

    /// List contributions newest first, optionally filtered by status and
    /// department, with pagination.
    pub async fn list(
        &self,
        status: Option<ContributionStatus>,
        department_id: Option<Uuid>,
        limit: u32,
        offset: i64,
    ) -> ApiResult<(Vec<ContributionRecord>, i64)> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            r#"
            SELECT c.id, c.user_id, u.username, c.event_id, e.title AS event_title,
                   c.department_id, d.name AS department_name, c.date, c.hours,
                   c.description, c.status, c.approved_by,
                   a.username AS approved_by_username, c.approved_at,
                   c.rejection_reason, c.created_at,
                   COUNT(*) OVER () AS total
            FROM contributions c
            JOIN users u ON u.id = c.user_id
            JOIN departments d ON d.id = c.department_id
            LEFT JOIN events e ON e.id = c.event_id
            LEFT JOIN users a ON a.id = c.approved_by
            WHERE 1 = 1
            "#
        ));

        if let Some(status) = status {
            qb.push(" AND c.status = ").push_bind(status.as_str());
        }

        if let Some(department_id) = department_id {
            qb.push(" AND c.department_id = ").push_bind(department_id);
        }

        qb.push(" ORDER BY c.created_at DESC LIMIT ")
            .push_bind(limit as i64)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = qb.build().fetch_all(&self.pool).await?;
        let total = rows.first().map(|row| row.get("total")).unwrap_or(0);
        let records = rows.iter().map(record_from_row).collect::<ApiResult<Vec<_>>>()?;

        Ok((records, total))
    }

    /// Per-status counts under the same department filter as the listing
    pub async fn counts(&self, department_id: Option<Uuid>) -> ApiResult<StatusCounts> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            SELECT COUNT(*) FILTER (WHERE status = 'PENDING') AS pending,
                   COUNT(*) FILTER (WHERE status = 'APPROVED') AS approved,
                   COUNT(*) FILTER (WHERE status = 'REJECTED') AS rejected
            FROM contributions
            WHERE 1 = 1
            "#,
        );

        if let Some(department_id) = department_id {
            qb.push(" AND department_id = ").push_bind(department_id);
        }

        let row = qb.build().fetch_one(&self.pool).await?;

        Ok(StatusCounts {
            pending: row.get("pending"),
            approved: row.get("approved"),
            rejected: row.get("rejected"),
        })
    }

    /// Most recent pending contributions, for the coordinator dashboard
    pub async fn recent_pending(&self, limit: i64) -> ApiResult<Vec<ContributionRecord>> {
        let sql = format!(
            "{RECORD_SELECT} WHERE c.status = 'PENDING' ORDER BY c.created_at DESC LIMIT $1"
        );
        let rows = sqlx::query(&sql).bind(limit).fetch_all(&self.pool).await?;

        rows.iter().map(record_from_row).collect()
    }

    /// The user's own most recent pending contributions
    pub async fn recent_pending_for_user(&self, user_id: Uuid, limit: i64) -> ApiResult<Vec<ContributionRecord>> {
        let sql = format!(
            "{RECORD_SELECT} WHERE c.status = 'PENDING' AND c.user_id = $1 \
             ORDER BY c.created_at DESC LIMIT $2"
        );
        let rows = sqlx::query(&sql)
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(record_from_row).collect()
    }

    /// All contributions newest first, for the CSV export
    pub async fn export_records(&self) -> ApiResult<Vec<ContributionRecord>> {
        let sql = format!("{RECORD_SELECT} ORDER BY c.created_at DESC");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter().map(record_from_row).collect()
    }
}
