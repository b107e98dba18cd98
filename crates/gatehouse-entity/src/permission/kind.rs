//! Permission kind enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What a permission entry gates in the panel.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "permission_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PermissionType {
    /// A navigation entry.
    #[default]
    Menu,
    /// An action button inside a page.
    Button,
    /// A backend endpoint.
    Api,
}

impl PermissionType {
    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Menu => "menu",
            Self::Button => "button",
            Self::Api => "api",
        }
    }
}

impl fmt::Display for PermissionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PermissionType {
    type Err = gatehouse_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "menu" => Ok(Self::Menu),
            "button" => Ok(Self::Button),
            "api" => Ok(Self::Api),
            _ => Err(gatehouse_core::AppError::validation(format!(
                "Invalid permission type: '{s}'. Expected one of: menu, button, api"
            ))),
        }
    }
}
