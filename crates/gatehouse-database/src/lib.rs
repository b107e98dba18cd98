//! # gatehouse-database
//!
//! The RBAC repository: store traits consumed by the authorization engine
//! and the services, their PostgreSQL implementations, an in-memory
//! implementation used as a test double, connection pooling, and the
//! embedded migrations.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use store::{OperationLogStore, PermissionStore, RoleStore, Stores, UserStore};
