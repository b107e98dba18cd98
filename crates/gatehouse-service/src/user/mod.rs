//! Administrative user management.

pub mod service;

pub use service::{CreateUserInput, UpdateUserInput, UserService, UserWithRoles};
