//! `[server]` and `[server.cors]` sections.

use serde::{Deserialize, Serialize};

/// Listener and request handling limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Requests running longer than this are aborted.
    pub request_timeout_seconds: u64,
    pub max_body_bytes: usize,
    /// Send store and internal failure text to clients. Off outside development.
    pub expose_internal_errors: bool,
    pub cors: CorsConfig,
}

impl ServerConfig {
    /// `host:port` as passed to the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            request_timeout_seconds: 30,
            max_body_bytes: 1024 * 1024,
            expose_internal_errors: false,
            cors: CorsConfig::default(),
        }
    }
}

/// Cross-origin policy. A single `"*"` origin allows any origin.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    /// Preflight cache lifetime.
    pub max_age_seconds: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        let methods = ["GET", "POST", "PUT", "DELETE", "PATCH", "OPTIONS"];
        Self {
            allowed_origins: vec!["*".to_string()],
            allowed_methods: methods.into_iter().map(String::from).collect(),
            max_age_seconds: 3600,
        }
    }
}
