//! Axum middleware stack.

pub mod authorize;
pub mod cors;
pub mod logging;
pub mod operation_log;
pub mod rate_limit;
