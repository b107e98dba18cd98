//! Integration tests driving the full router over the in-memory store.

mod access_test;
mod auth_test;
mod helpers;
mod log_test;
mod permission_test;
mod rate_limit_test;
mod role_test;
mod user_test;
