//! Permission entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::kind::PermissionType;
use crate::status::Status;

/// Parent id of top-level permissions.
pub const ROOT_PARENT_ID: i64 = 0;

/// A grantable permission. Rows form a tree through `parent_id`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    /// Unique permission identifier.
    pub id: i64,
    /// Display name.
    pub permission_name: String,
    /// Stable code checked by the authorization engine, e.g. `user:manage`.
    pub permission_code: String,
    /// Menu, button or api.
    pub permission_type: PermissionType,
    /// Parent permission id, [`ROOT_PARENT_ID`] for roots.
    pub parent_id: i64,
    /// Front-end route path.
    pub path: Option<String>,
    /// Front-end component name.
    pub component: Option<String>,
    /// Menu icon.
    pub icon: Option<String>,
    /// Sibling ordering key.
    pub sort_order: i32,
    pub description: Option<String>,
    /// Only enabled permissions are granted.
    pub status: Status,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Permission {
    /// Whether this permission hangs directly under the root.
    pub fn is_root(&self) -> bool {
        self.parent_id == ROOT_PARENT_ID
    }
}

/// Data required to insert a permission.
#[derive(Debug, Clone)]
pub struct NewPermission {
    pub permission_name: String,
    pub permission_code: String,
    pub permission_type: PermissionType,
    pub parent_id: i64,
    pub path: Option<String>,
    pub component: Option<String>,
    pub icon: Option<String>,
    pub sort_order: i32,
    pub description: Option<String>,
    pub status: Status,
    pub created_by: Option<i64>,
}

/// Partial permission update. The code is immutable once created.
#[derive(Debug, Clone, Default)]
pub struct PermissionChanges {
    pub permission_name: Option<String>,
    pub permission_type: Option<PermissionType>,
    pub parent_id: Option<i64>,
    pub path: Option<String>,
    pub component: Option<String>,
    pub icon: Option<String>,
    pub sort_order: Option<i32>,
    pub description: Option<String>,
    pub status: Option<Status>,
    pub updated_by: Option<i64>,
}
