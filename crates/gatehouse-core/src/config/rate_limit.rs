//! Rate limiting configuration.

use serde::{Deserialize, Serialize};

/// Fixed-window request budgets keyed by client address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Whether rate limiting is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Global window length in milliseconds.
    #[serde(default = "default_window")]
    pub window_ms: u64,
    /// Requests allowed per client per global window.
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,
    /// Login window length in milliseconds.
    #[serde(default = "default_login_window")]
    pub login_window_ms: u64,
    /// Login attempts allowed per client per login window.
    #[serde(default = "default_login_max")]
    pub login_max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_ms: default_window(),
            max_requests: default_max_requests(),
            login_window_ms: default_login_window(),
            login_max_requests: default_login_max(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_window() -> u64 {
    15 * 60 * 1000
}

fn default_max_requests() -> u32 {
    100
}

fn default_login_window() -> u64 {
    3 * 60 * 1000
}

fn default_login_max() -> u32 {
    5
}
