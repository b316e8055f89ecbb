//! Signup repository: the per-user, per-event registration ledger
//!
//! Two concurrent signups racing for the last spot must not both succeed,
//! so `signup` locks the event row for the duration of the check-and-insert
//! transaction. The `(user_id, event_id)` unique constraint keeps the ledger
//! at one logical row per pair; re-signup after cancellation flips the
//! existing row back to CONFIRMED instead of inserting a second one.

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::event::{EventStatus, Participant};
use crate::models::signup::{Signup, SignupStatus, SignupWithEvent};

/// Signup repository
#[derive(Clone)]
pub struct SignupRepository {
    pool: PgPool,
}

fn signup_from_row(row: &PgRow) -> ApiResult<Signup> {
    let status: String = row.get("status");
    let status = SignupStatus::parse(&status)
        .ok_or_else(|| anyhow::anyhow!("Unexpected signup status in database: {status}"))?;

    Ok(Signup {
        id: row.get("id"),
        user_id: row.get("user_id"),
        event_id: row.get("event_id"),
        status,
        created_at: row.get("created_at"),
    })
}

impl SignupRepository {
    /// Create a new signup repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Sign a user up for an event.
    ///
    /// The event row is locked while the duplicate and capacity checks run,
    /// so the confirmed count can never pass capacity even under concurrent
    /// requests for the last spot.
    pub async fn signup(&self, user_id: Uuid, event_id: Uuid) -> ApiResult<Signup> {
        let mut tx = self.pool.begin().await?;

        let event = sqlx::query("SELECT capacity FROM events WHERE id = $1 FOR UPDATE")
            .bind(event_id)
            .fetch_optional(&mut *tx)
            .await?;
        let capacity: i32 = event.ok_or(ApiError::NotFound)?.get("capacity");

        let already_signed_up: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM signups
                WHERE user_id = $1 AND event_id = $2 AND status = 'CONFIRMED'
            )
            "#,
        )
        .bind(user_id)
        .bind(event_id)
        .fetch_one(&mut *tx)
        .await?;

        if already_signed_up {
            return Err(ApiError::AlreadySignedUp);
        }

        if capacity > 0 {
            let confirmed: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM signups WHERE event_id = $1 AND status = 'CONFIRMED'",
            )
            .bind(event_id)
            .fetch_one(&mut *tx)
            .await?;

            if confirmed >= capacity as i64 {
                return Err(ApiError::EventFull);
            }
        }

        let row = sqlx::query(
            r#"
            INSERT INTO signups (user_id, event_id, status)
            VALUES ($1, $2, 'CONFIRMED')
            ON CONFLICT (user_id, event_id)
                DO UPDATE SET status = 'CONFIRMED', created_at = now()
            RETURNING id, user_id, event_id, status, created_at
            "#,
        )
        .bind(user_id)
        .bind(event_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!("User {} signed up for event {}", user_id, event_id);
        signup_from_row(&row)
    }

    /// Cancel a signup. Scoped to the owning user and CONFIRMED status, so
    /// cancelling someone else's signup or cancelling twice both come back
    /// as `NotFound`. The row is kept for audit history.
    pub async fn cancel(&self, signup_id: Uuid, user_id: Uuid) -> ApiResult<Signup> {
        let row = sqlx::query(
            r#"
            UPDATE signups
            SET status = 'CANCELLED'
            WHERE id = $1 AND user_id = $2 AND status = 'CONFIRMED'
            RETURNING id, user_id, event_id, status, created_at
            "#,
        )
        .bind(signup_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let signup = row.as_ref().map(signup_from_row).transpose()?.ok_or(ApiError::NotFound)?;

        info!("User {} cancelled signup {}", user_id, signup_id);
        Ok(signup)
    }

    /// The user's confirmed signups for scheduled events, soonest first
    pub async fn list_for_user(&self, user_id: Uuid) -> ApiResult<Vec<SignupWithEvent>> {
        let rows = sqlx::query(
            r#"
            SELECT s.id, s.event_id, s.status, s.created_at,
                   e.title AS event_title, e.date AS event_date,
                   e.location AS event_location, e.status AS event_status
            FROM signups s
            JOIN events e ON e.id = s.event_id
            WHERE s.user_id = $1 AND s.status = 'CONFIRMED' AND e.status = 'SCHEDULED'
            ORDER BY e.date
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let status: String = row.get("status");
                let status = SignupStatus::parse(&status).ok_or_else(|| {
                    anyhow::anyhow!("Unexpected signup status in database: {status}")
                })?;
                let event_status: String = row.get("event_status");
                let event_status = EventStatus::parse(&event_status).ok_or_else(|| {
                    anyhow::anyhow!("Unexpected event status in database: {event_status}")
                })?;

                Ok(SignupWithEvent {
                    id: row.get("id"),
                    event_id: row.get("event_id"),
                    event_title: row.get("event_title"),
                    event_date: row.get("event_date"),
                    event_location: row.get("event_location"),
                    event_status,
                    status,
                    created_at: row.get("created_at"),
                })
            })
            .collect()
    }

    /// Whether the user holds a confirmed signup for the event
    pub async fn is_signed_up(&self, user_id: Uuid, event_id: Uuid) -> ApiResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM signups
                WHERE user_id = $1 AND event_id = $2 AND status = 'CONFIRMED'
            )
            "#,
        )
        .bind(user_id)
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Confirmed participants of an event, in signup order
    pub async fn participants(&self, event_id: Uuid) -> ApiResult<Vec<Participant>> {
        let rows = sqlx::query(
            r#"
            SELECT u.id AS user_id, u.username, s.created_at AS signed_up_at
            FROM signups s
            JOIN users u ON u.id = s.user_id
            WHERE s.event_id = $1 AND s.status = 'CONFIRMED'
            ORDER BY s.created_at
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| Participant {
                user_id: row.get("user_id"),
                username: row.get("username"),
                signed_up_at: row.get("signed_up_at"),
            })
            .collect())
    }
}
