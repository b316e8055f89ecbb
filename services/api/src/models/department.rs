//! Department model and payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Department entity
#[derive(Debug, Clone, Serialize)]
pub struct Department {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating or renaming a department
#[derive(Debug, Clone, Deserialize)]
pub struct DepartmentRequest {
    pub name: String,
}
