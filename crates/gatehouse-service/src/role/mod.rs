//! Role management and permission grants.

pub mod service;

pub use service::{CreateRoleInput, RoleService, RoleWithPermissions, UpdateRoleInput};
