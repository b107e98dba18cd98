//! # gatehouse-entity
//!
//! Domain entity models for Gatehouse. Every struct in this crate
//! represents a database table row, an insert/update payload for one, or
//! a domain value object. Row types derive `sqlx::FromRow` and serialize
//! with camelCase field names, which is the shape the HTTP API exposes.

pub mod operation_log;
pub mod permission;
pub mod role;
pub mod status;
pub mod user;

pub use status::Status;
