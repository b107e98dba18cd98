//! # gatehouse-api
//!
//! HTTP API layer for Gatehouse built on Axum.
//!
//! Provides the REST endpoints, the declarative route access table, the
//! middleware stack (authorization, rate limiting, operation logging,
//! request logging, CORS), extractors, DTOs, and error mapping.

pub mod access;
pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use error::ApiError;
pub use state::AppState;
