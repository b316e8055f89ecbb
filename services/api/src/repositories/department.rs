//! Department repository for database operations

use sqlx::{PgPool, Row};
use sqlx::postgres::PgRow;
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult, is_unique_violation};
use crate::models::department::Department;

/// Department repository
#[derive(Clone)]
pub struct DepartmentRepository {
    pool: PgPool,
}

fn department_from_row(row: &PgRow) -> Department {
    Department {
        id: row.get("id"),
        name: row.get("name"),
        created_at: row.get("created_at"),
    }
}

impl DepartmentRepository {
    /// Create a new department repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new department with a unique name
    pub async fn create(&self, name: &str) -> ApiResult<Department> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::Validation("Department name is required".into()));
        }

        info!("Creating department: {}", name);

        let row = sqlx::query(
            r#"
            INSERT INTO departments (name)
            VALUES ($1)
            RETURNING id, name, created_at
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                ApiError::Validation("A department with this name already exists".into())
            } else {
                err.into()
            }
        })?;

        Ok(department_from_row(&row))
    }

    /// Rename an existing department
    pub async fn rename(&self, id: Uuid, name: &str) -> ApiResult<Department> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::Validation("Department name is required".into()));
        }

        let row = sqlx::query(
            r#"
            UPDATE departments
            SET name = $2
            WHERE id = $1
            RETURNING id, name, created_at
            "#,
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                ApiError::Validation("A department with this name already exists".into())
            } else {
                err.into()
            }
        })?;

        row.map(|row| department_from_row(&row))
            .ok_or(ApiError::NotFound)
    }

    /// List all departments ordered by name
    pub async fn list(&self) -> ApiResult<Vec<Department>> {
        let rows = sqlx::query("SELECT id, name, created_at FROM departments ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(department_from_row).collect())
    }

    /// Fetch a department by name, creating it if absent. Idempotent;
    /// used by the bootstrap command.
    pub async fn get_or_create(&self, name: &str) -> ApiResult<Department> {
        sqlx::query("INSERT INTO departments (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(name)
            .execute(&self.pool)
            .await?;

        let row = sqlx::query("SELECT id, name, created_at FROM departments WHERE name = $1")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;

        Ok(department_from_row(&row))
    }

    /// Delete a department. Events and profiles keep their rows with the
    /// department cleared; contributions logged against it go with it.
    pub async fn delete(&self, id: Uuid) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM departments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound);
        }

        info!("Deleted department {}", id);
        Ok(())
    }
}
