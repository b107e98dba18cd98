//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::status::Status;

/// An account that can log in to the panel.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user identifier.
    pub id: i64,
    /// Unique login name.
    pub username: String,
    /// Argon2 password hash.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Email address, unique when present.
    pub email: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Real name shown in the panel.
    pub real_name: Option<String>,
    /// Account status.
    pub status: Status,
    /// Last successful login time.
    pub last_login_time: Option<DateTime<Utc>>,
    /// Client address of the last successful login.
    pub last_login_ip: Option<String>,
    /// The user who created this account.
    pub created_by: Option<i64>,
    /// The user who last modified this account.
    pub updated_by: Option<i64>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check if the user can log in right now.
    pub fn can_login(&self) -> bool {
        self.status.is_enabled()
    }
}

/// Data required to insert a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Login name.
    pub username: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Email.
    pub email: Option<String>,
    /// Phone.
    pub phone: Option<String>,
    /// Real name.
    pub real_name: Option<String>,
    /// Initial status.
    pub status: Status,
    /// Creating user, `None` for self-registration.
    pub created_by: Option<i64>,
}

/// Partial profile update. `None` leaves a column unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    /// New email.
    pub email: Option<String>,
    /// New phone.
    pub phone: Option<String>,
    /// New real name.
    pub real_name: Option<String>,
    /// New status.
    pub status: Option<Status>,
    /// Acting user.
    pub updated_by: Option<i64>,
}

/// List filters for users.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    /// Substring match on username.
    pub username: Option<String>,
    /// Substring match on email.
    pub email: Option<String>,
    /// Exact status.
    pub status: Option<Status>,
}
