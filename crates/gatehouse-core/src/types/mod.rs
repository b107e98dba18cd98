//! Core type definitions used across the Gatehouse workspace.

pub mod pagination;

pub use pagination::{PageRequest, PageResponse};
