//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Credential hashing and session token configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Token lifetime in hours.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_hours: u64,
    /// Argon2 memory cost in KiB.
    #[serde(default = "default_memory_kib")]
    pub password_memory_kib: u32,
    /// Argon2 iteration count.
    #[serde(default = "default_iterations")]
    pub password_iterations: u32,
    /// Argon2 lanes.
    #[serde(default = "default_parallelism")]
    pub password_parallelism: u32,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Role code assigned to self-registered users, when that role exists.
    #[serde(default = "default_role_code")]
    pub default_role_code: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            token_ttl_hours: default_token_ttl(),
            password_memory_kib: default_memory_kib(),
            password_iterations: default_iterations(),
            password_parallelism: default_parallelism(),
            password_min_length: default_password_min(),
            default_role_code: default_role_code(),
        }
    }
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_token_ttl() -> u64 {
    24
}

fn default_memory_kib() -> u32 {
    19 * 1024
}

fn default_iterations() -> u32 {
    2
}

fn default_parallelism() -> u32 {
    1
}

fn default_password_min() -> usize {
    6
}

fn default_role_code() -> String {
    "USER".to_string()
}
