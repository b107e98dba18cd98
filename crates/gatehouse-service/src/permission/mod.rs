//! Permission hierarchy management.

pub mod service;

pub use service::{CreatePermissionInput, PermissionService, UpdatePermissionInput};
