//! User and profile models and related payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

/// A user joined with their profile, as exposed through the API
#[derive(Debug, Clone, Serialize)]
pub struct UserAccount {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_coordinator: bool,
    pub department_id: Option<Uuid>,
    pub department_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// New user creation payload
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// User login credentials
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username_or_email: String,
    pub password: String,
}

/// Response for successful registration or login
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user: UserAccount,
}

/// Query parameters for the coordinator management listing
#[derive(Debug, Clone, Deserialize)]
pub struct UserListQuery {
    pub search: Option<String>,
    pub department: Option<Uuid>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}
