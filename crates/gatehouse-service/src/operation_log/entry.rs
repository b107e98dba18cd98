//! Turning a captured request/response pair into a log entry.

use chrono::{DateTime, Utc};
use serde_json::Value;

use gatehouse_entity::operation_log::{NewOperationLog, OperationOutcome};

/// Replacement for password-like values in recorded params.
pub const REDACTED: &str = "******";

/// Everything the pipeline observed about one `/api` request.
#[derive(Debug, Clone)]
pub struct CapturedExchange<'a> {
    pub user_id: Option<i64>,
    pub username: Option<String>,
    /// Matched route pattern, or the raw path when nothing matched.
    pub operation: String,
    pub method: String,
    pub url: String,
    pub ip: Option<String>,
    pub query: Option<&'a str>,
    pub request_body: &'a [u8],
    pub status: u16,
    pub response_body: &'a [u8],
    pub execute_time_ms: i64,
    pub received_at: DateTime<Utc>,
}

impl CapturedExchange<'_> {
    /// Build the entry, redacting secrets and truncating bodies to
    /// `max_chars` characters.
    ///
    /// A response is a failure when its status is 4xx/5xx or its envelope
    /// says `success: false`.
    pub fn into_entry(self, max_chars: usize) -> NewOperationLog {
        let params = if self.request_body.is_empty() {
            self.query.filter(|q| !q.is_empty()).map(str::to_string)
        } else {
            Some(redact(&String::from_utf8_lossy(self.request_body)))
        };

        let envelope: Option<Value> = serde_json::from_slice(self.response_body).ok();
        let declared_failure = envelope
            .as_ref()
            .and_then(|v| v.get("success"))
            .and_then(Value::as_bool)
            == Some(false);
        let failed = self.status >= 400 || declared_failure;

        let error_msg = if failed {
            envelope
                .as_ref()
                .and_then(|v| v.get("message"))
                .and_then(Value::as_str)
                .map(|m| truncate(m, max_chars))
        } else {
            None
        };

        let result = (!self.response_body.is_empty())
            .then(|| truncate(&String::from_utf8_lossy(self.response_body), max_chars));

        NewOperationLog {
            user_id: self.user_id,
            username: self.username,
            operation: self.operation,
            method: self.method,
            url: self.url,
            ip: self.ip,
            params: params.map(|p| truncate(&p, max_chars)),
            result,
            status: if failed {
                OperationOutcome::Failure
            } else {
                OperationOutcome::Success
            },
            error_msg,
            execute_time: self.execute_time_ms,
            created_at: self.received_at,
        }
    }
}

/// Mask every JSON value whose key mentions "password". Non-JSON input is
/// returned unchanged.
pub fn redact(raw: &str) -> String {
    match serde_json::from_str::<Value>(raw) {
        Ok(mut value) => {
            mask(&mut value);
            value.to_string()
        }
        Err(_) => raw.to_string(),
    }
}

fn mask(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, v) in map.iter_mut() {
                if key.to_ascii_lowercase().contains("password") {
                    *v = Value::String(REDACTED.to_string());
                } else {
                    mask(v);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(mask),
        _ => {}
    }
}

/// Cut `raw` to at most `max_chars` characters.
pub fn truncate(raw: &str, max_chars: usize) -> String {
    match raw.char_indices().nth(max_chars) {
        Some((end, _)) => raw[..end].to_string(),
        None => raw.to_string(),
    }
}
