//! User repository for database operations
//!
//! Account creation inserts the user and its profile in one transaction.
//! New users are volunteers; the coordinator flag lives on the profile and
//! is only flipped through `set_coordinator`.

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult, is_unique_violation};
use crate::models::user::{RegisterRequest, User, UserAccount};

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        created_at: row.get("created_at"),
    }
}

fn account_from_row(row: &PgRow) -> UserAccount {
    UserAccount {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        is_coordinator: row.get("is_coordinator"),
        department_id: row.get("department_id"),
        department_name: row.get("department_name"),
        created_at: row.get("created_at"),
    }
}

const ACCOUNT_SELECT: &str = r#"
    SELECT u.id, u.username, u.email, u.first_name, u.last_name, u.created_at,
           p.is_coordinator, p.department_id, d.name AS department_name
    FROM users u
    JOIN profiles p ON p.user_id = u.id
    LEFT JOIN departments d ON d.id = p.department_id
"#;

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user account and its profile atomically.
    ///
    /// The profile is created alongside the user in the same transaction,
    /// with `is_coordinator = false`.
    pub async fn create(&self, new_user: &RegisterRequest) -> ApiResult<User> {
        info!("Creating new user: {}", new_user.username);

        // Hash the password
        let salt = SaltString::generate(&mut rand::thread_rng());
        let argon2 = Argon2::default();
        let password_hash = argon2
            .hash_password(new_user.password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
            .to_string();

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            INSERT INTO users (username, email, password_hash, first_name, last_name)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, email, password_hash, first_name, last_name, created_at
            "#,
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&password_hash)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                ApiError::Validation("Username or email is already taken".into())
            } else {
                err.into()
            }
        })?;

        let user = user_from_row(&row);

        sqlx::query("INSERT INTO profiles (user_id) VALUES ($1)")
            .bind(user.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(user)
    }

    /// Find a user by username or email
    pub async fn find_by_username_or_email(&self, username_or_email: &str) -> ApiResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, password_hash, first_name, last_name, created_at
            FROM users
            WHERE username = $1 OR email = $1
            "#,
        )
        .bind(username_or_email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| user_from_row(&row)))
    }

    /// Verify a user's password
    pub fn verify_password(&self, user: &User, password: &str) -> ApiResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|e| anyhow::anyhow!("Failed to parse password hash: {}", e))?;

        let argon2 = Argon2::default();
        Ok(argon2.verify_password(password.as_bytes(), &parsed_hash).is_ok())
    }

    /// Find a user joined with their profile and department
    pub async fn find_account(&self, user_id: Uuid) -> ApiResult<Option<UserAccount>> {
        let sql = format!("{ACCOUNT_SELECT} WHERE u.id = $1");
        let row = sqlx::query(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| account_from_row(&row)))
    }

    /// List accounts for the coordinator management view, with an optional
    /// case-insensitive search over name fields and a department filter.
    pub async fn list(
        &self,
        search: Option<&str>,
        department_id: Option<Uuid>,
        limit: u32,
        offset: i64,
    ) -> ApiResult<(Vec<UserAccount>, i64)> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            SELECT u.id, u.username, u.email, u.first_name, u.last_name, u.created_at,
                   p.is_coordinator, p.department_id, d.name AS department_name,
                   COUNT(*) OVER () AS total
            FROM users u
            JOIN profiles p ON p.user_id = u.id
            LEFT JOIN departments d ON d.id = p.department_id
            WHERE 1 = 1
            "#,
        );

        if let Some(department_id) = department_id {
            qb.push(" AND p.department_id = ").push_bind(department_id);
        }

        if let Some(search) = search.filter(|s| !s.trim().is_empty()) {
            let pattern = format!("%{}%", search.trim());
            qb.push(" AND (u.username ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR u.email ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR u.first_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR u.last_name ILIKE ")
                .push_bind(pattern)
                .push(")");
        }

        qb.push(" ORDER BY u.username LIMIT ")
            .push_bind(limit as i64)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = qb.build().fetch_all(&self.pool).await?;
        let total = rows.first().map(|row| row.get("total")).unwrap_or(0);
        let accounts = rows.iter().map(account_from_row).collect();

        Ok((accounts, total))
    }

    /// Grant or revoke coordinator status. On promotion, the optional
    /// department is assigned only when the target has none of their own;
    /// an existing assignment is never overwritten.
    pub async fn set_coordinator(
        &self,
        target_id: Uuid,
        is_coordinator: bool,
        department_id: Option<Uuid>,
    ) -> ApiResult<UserAccount> {
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET is_coordinator = $2,
                department_id = COALESCE(department_id, $3)
            WHERE user_id = $1
            "#,
        )
        .bind(target_id)
        .bind(is_coordinator)
        .bind(department_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound);
        }

        info!(
            "User {} {} coordinator",
            target_id,
            if is_coordinator { "promoted to" } else { "removed from" }
        );

        self.find_account(target_id).await?.ok_or(ApiError::NotFound)
    }
}
