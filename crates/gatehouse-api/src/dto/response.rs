//! Response DTOs and the JSON envelope every endpoint returns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Message used for successful responses that carry no custom text.
pub const SUCCESS_MESSAGE: &str = "Operation successful";

/// Standard response envelope: `{success, message, data?, errors?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request was successful.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
    /// Response payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Field-level validation detail on failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<serde_json::Value>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response carrying `data`.
    pub fn ok(data: T) -> Self {
        Self::with_message(SUCCESS_MESSAGE, data)
    }

    /// Creates a successful response with a custom message.
    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            errors: None,
        }
    }
}

impl ApiResponse<()> {
    /// Creates a successful response without data.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            errors: None,
        }
    }

    /// Creates a failure envelope.
    pub fn failure(message: impl Into<String>, errors: Option<serde_json::Value>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            errors,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status.
    pub status: String,
    /// Version.
    pub version: String,
    /// Server time.
    pub timestamp: DateTime<Utc>,
}

/// Number of rows a bulk delete removed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RemovedResponse {
    pub removed: u64,
}
