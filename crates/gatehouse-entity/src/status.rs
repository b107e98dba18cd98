//! Enabled/disabled flag shared by users, roles and permissions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle flag for users, roles and permissions.
///
/// Only `Enabled` rows take part in authorization.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "record_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Active and effective.
    #[default]
    Enabled,
    /// Kept on record but ignored by authorization.
    Disabled,
}

impl Status {
    /// Whether the row is effective.
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Status {
    type Err = gatehouse_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "enabled" | "1" => Ok(Self::Enabled),
            "disabled" | "0" => Ok(Self::Disabled),
            _ => Err(gatehouse_core::AppError::validation(format!(
                "Invalid status: '{s}'. Expected one of: enabled, disabled"
            ))),
        }
    }
}
