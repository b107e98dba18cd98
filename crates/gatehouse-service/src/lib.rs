//! # gatehouse-service
//!
//! Business logic for Gatehouse. Each service orchestrates the injected
//! stores, the credential primitives and the authorization engine to
//! implement one group of admin use cases.
//!
//! Services follow constructor injection: every dependency is handed in
//! at construction time as an `Arc` or a cheap clone.

pub mod auth;
pub mod context;
pub mod dashboard;
pub mod operation_log;
pub mod permission;
pub mod role;
pub mod user;

pub use auth::AuthService;
pub use context::RequestContext;
pub use dashboard::{DashboardService, DashboardStats};
pub use operation_log::{OperationLogService, OperationLogSink};
pub use permission::PermissionService;
pub use role::RoleService;
pub use user::UserService;

#[cfg(test)]
pub(crate) mod test_support;
