//! Event repository for database operations
//!
//! Capacity state (confirmed count, remaining spots, fullness) is derived
//! from the signups table on every read; it is never cached on the event.

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::event::{Event, EventRequest, EventStatus, EventWithCounts};

/// Event repository
#[derive(Clone)]
pub struct EventRepository {
    pool: PgPool,
}

fn event_from_row(row: &PgRow) -> ApiResult<Event> {
    let status: String = row.get("status");
    let status = EventStatus::parse(&status)
        .ok_or_else(|| anyhow::anyhow!("Unexpected event status in database: {status}"))?;

    Ok(Event {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        department_id: row.get("department_id"),
        date: row.get("date"),
        location: row.get("location"),
        capacity: row.get("capacity"),
        status,
        created_by: row.get("created_by"),
        created_at: row.get("created_at"),
    })
}

fn event_with_counts_from_row(row: &PgRow) -> ApiResult<EventWithCounts> {
    let event = event_from_row(row)?;
    let confirmed: i64 = row.get("confirmed_count");
    Ok(EventWithCounts::new(event, confirmed))
}

const EVENT_COLUMNS: &str =
    "e.id, e.title, e.description, e.department_id, e.date, e.location, \
     e.capacity, e.status, e.created_by, e.created_at";

const CONFIRMED_COUNT: &str = "(SELECT COUNT(*) FROM signups s \
     WHERE s.event_id = e.id AND s.status = 'CONFIRMED') AS confirmed_count";

impl EventRepository {
    /// Create a new event repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new event on behalf of a coordinator
    pub async fn create(&self, created_by: Uuid, request: &EventRequest) -> ApiResult<Event> {
        if request.title.trim().is_empty() {
            return Err(ApiError::Validation("Event title is required".into()));
        }
        if request.capacity < 0 {
            return Err(ApiError::Validation("Capacity cannot be negative".into()));
        }

        info!("Creating event: {}", request.title);

        let row = sqlx::query(
            r#"
            INSERT INTO events (title, description, department_id, date, location, capacity, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, title, description, department_id, date, location,
                      capacity, status, created_by, created_at
            "#,
        )
        .bind(request.title.trim())
        .bind(&request.description)
        .bind(request.department_id)
        .bind(request.date)
        .bind(&request.location)
        .bind(request.capacity)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        event_from_row(&row)
    }

    /// Update an event. Only the creating coordinator may edit it; the
    /// lookup is scoped to the creator, so anyone else sees `NotFound`.
    pub async fn update(&self, id: Uuid, actor_id: Uuid, request: &EventRequest) -> ApiResult<Event> {
        if request.title.trim().is_empty() {
            return Err(ApiError::Validation("Event title is required".into()));
        }
        if request.capacity < 0 {
            return Err(ApiError::Validation("Capacity cannot be negative".into()));
        }

        let row = sqlx::query(
            r#"
            UPDATE events
            SET title = $3, description = $4, department_id = $5,
                date = $6, location = $7, capacity = $8
            WHERE id = $1 AND created_by = $2
            RETURNING id, title, description, department_id, date, location,
                      capacity, status, created_by, created_at
            "#,
        )
        .bind(id)
        .bind(actor_id)
        .bind(request.title.trim())
        .bind(&request.description)
        .bind(request.department_id)
        .bind(request.date)
        .bind(&request.location)
        .bind(request.capacity)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref()
            .map(event_from_row)
            .transpose()?
            .ok_or(ApiError::NotFound)
    }

    /// Delete an event. Only the creating coordinator may delete it.
    pub async fn delete(&self, id: Uuid, actor_id: Uuid) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1 AND created_by = $2")
            .bind(id)
            .bind(actor_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound);
        }

        info!("Deleted event {}", id);
        Ok(())
    }

    /// Update event lifecycle status. Transitions are free among the
    /// three states and open to any coordinator.
    pub async fn set_status(&self, id: Uuid, status: EventStatus) -> ApiResult<Event> {
        let row = sqlx::query(
            r#"
            UPDATE events
            SET status = $2
            WHERE id = $1
            RETURNING id, title, description, department_id, date, location,
                      capacity, status, created_by, created_at
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref()
            .map(event_from_row)
            .transpose()?
            .ok_or(ApiError::NotFound)
    }

    /// Find an event by ID together with its recomputed signup counts
    pub async fn find_by_id(&self, id: Uuid) -> ApiResult<Option<EventWithCounts>> {
        let sql = format!("SELECT {EVENT_COLUMNS}, {CONFIRMED_COUNT} FROM events e WHERE e.id = $1");
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;

        row.as_ref().map(event_with_counts_from_row).transpose()
    }

    /// List events with status filter, creator filter, search, and
    /// pagination, newest first.
    pub async fn list(
        &self,
        status: Option<EventStatus>,
        created_by: Option<Uuid>,
        search: Option<&str>,
        limit: u32,
        offset: i64,
    ) -> ApiResult<(Vec<EventWithCounts>, i64)> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {EVENT_COLUMNS}, {CONFIRMED_COUNT}, COUNT(*) OVER () AS total \
             FROM events e WHERE 1 = 1"
        ));

        if let Some(status) = status {
            qb.push(" AND e.status = ").push_bind(status.as_str());
        }

        if let Some(created_by) = created_by {
            qb.push(" AND e.created_by = ").push_bind(created_by);
        }

        if let Some(search) = search.filter(|s| !s.trim().is_empty()) {
            let pattern = format!("%{}%", search.trim());
            qb.push(" AND (e.title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR e.description ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR e.location ILIKE ")
                .push_bind(pattern)
                .push(")");
        }

        qb.push(" ORDER BY e.date DESC LIMIT ")
            .push_bind(limit as i64)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = qb.build().fetch_all(&self.pool).await?;
        let total = rows.first().map(|row| row.get("total")).unwrap_or(0);
        let events = rows
            .iter()
            .map(event_with_counts_from_row)
            .collect::<ApiResult<Vec<_>>>()?;

        Ok((events, total))
    }

    /// Upcoming scheduled events created by a coordinator
    pub async fn upcoming_created_by(&self, user_id: Uuid, limit: i64) -> ApiResult<Vec<Event>> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events e \
             WHERE e.created_by = $1 AND e.date >= now() AND e.status = 'SCHEDULED' \
             ORDER BY e.date LIMIT $2"
        );
        let rows = sqlx::query(&sql)
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(event_from_row).collect()
    }

    /// Upcoming scheduled events, optionally scoped to a department
    pub async fn upcoming(&self, department_id: Option<Uuid>, limit: i64) -> ApiResult<Vec<Event>> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {EVENT_COLUMNS} FROM events e \
             WHERE e.date >= now() AND e.status = 'SCHEDULED'"
        ));

        if let Some(department_id) = department_id {
            qb.push(" AND e.department_id = ").push_bind(department_id);
        }

        qb.push(" ORDER BY e.date LIMIT ").push_bind(limit);

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(event_from_row).collect()
    }

    /// Number of events ever created by a user
    pub async fn count_created_by(&self, user_id: Uuid) -> ApiResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events WHERE created_by = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Scheduled events the user holds a confirmed signup for
    pub async fn signed_for_user(&self, user_id: Uuid) -> ApiResult<Vec<Event>> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events e \
             JOIN signups s ON s.event_id = e.id \
             WHERE s.user_id = $1 AND s.status = 'CONFIRMED' AND e.status = 'SCHEDULED' \
             ORDER BY e.date"
        );
        let rows = sqlx::query(&sql).bind(user_id).fetch_all(&self.pool).await?;

        rows.iter().map(event_from_row).collect()
    }

    /// Scheduled events the user has not signed up for
    pub async fn available_for_user(&self, user_id: Uuid) -> ApiResult<Vec<Event>> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events e \
             WHERE e.status = 'SCHEDULED' AND NOT EXISTS ( \
                 SELECT 1 FROM signups s \
                 WHERE s.event_id = e.id AND s.user_id = $1 AND s.status = 'CONFIRMED') \
             ORDER BY e.date"
        );
        let rows = sqlx::query(&sql).bind(user_id).fetch_all(&self.pool).await?;

        rows.iter().map(event_from_row).collect()
    }
}
