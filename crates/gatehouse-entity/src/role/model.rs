//! Role entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::status::Status;

/// A named bundle of permission grants assignable to users.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    /// Unique role identifier.
    pub id: i64,
    /// Unique display name.
    pub role_name: String,
    /// Unique stable code, e.g. `ADMIN`.
    pub role_code: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Only enabled roles grant permissions.
    pub status: Status,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data required to insert a role.
#[derive(Debug, Clone)]
pub struct NewRole {
    pub role_name: String,
    pub role_code: String,
    pub description: Option<String>,
    pub status: Status,
    pub created_by: Option<i64>,
}

/// Partial role update. The code is immutable once created.
#[derive(Debug, Clone, Default)]
pub struct RoleChanges {
    pub role_name: Option<String>,
    pub description: Option<String>,
    pub status: Option<Status>,
    pub updated_by: Option<i64>,
}

/// List filters for roles.
#[derive(Debug, Clone, Default)]
pub struct RoleFilter {
    /// Substring match on role name.
    pub role_name: Option<String>,
    /// Exact status.
    pub status: Option<Status>,
}
