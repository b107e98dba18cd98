//! Operation log entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// Outcome of a logged request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "operation_outcome", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OperationOutcome {
    /// 2xx/3xx with a successful envelope.
    Success,
    /// Error status or `success: false` envelope.
    Failure,
}

impl OperationOutcome {
    /// Return the outcome as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

impl fmt::Display for OperationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OperationOutcome {
    type Err = gatehouse_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "success" | "1" => Ok(Self::Success),
            "failure" | "0" => Ok(Self::Failure),
            _ => Err(gatehouse_core::AppError::validation(format!(
                "Invalid outcome: '{s}'. Expected one of: success, failure"
            ))),
        }
    }
}

/// One recorded pipeline request. Rows are never updated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OperationLog {
    /// Unique log identifier.
    pub id: i64,
    /// Acting user, `None` for anonymous requests.
    pub user_id: Option<i64>,
    /// Acting username at request time.
    pub username: Option<String>,
    /// Matched route pattern, e.g. `/api/user/{id}`.
    pub operation: String,
    /// HTTP method.
    pub method: String,
    /// Request path including query string.
    pub url: String,
    /// Client address.
    pub ip: Option<String>,
    /// Truncated request body or query.
    pub params: Option<String>,
    /// Truncated response body.
    pub result: Option<String>,
    /// Request outcome.
    pub status: OperationOutcome,
    /// Error message when the envelope carried one.
    pub error_msg: Option<String>,
    /// Handling time in milliseconds.
    pub execute_time: i64,
    /// When the request was received.
    pub created_at: DateTime<Utc>,
}

/// An entry waiting to be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOperationLog {
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub operation: String,
    pub method: String,
    pub url: String,
    pub ip: Option<String>,
    pub params: Option<String>,
    pub result: Option<String>,
    pub status: OperationOutcome,
    pub error_msg: Option<String>,
    pub execute_time: i64,
    pub created_at: DateTime<Utc>,
}

/// List filters for operation logs.
#[derive(Debug, Clone, Default)]
pub struct OperationLogFilter {
    /// Substring match on username.
    pub username: Option<String>,
    /// Substring match on the route pattern.
    pub operation: Option<String>,
    /// Exact outcome.
    pub status: Option<OperationOutcome>,
}
