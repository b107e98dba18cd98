//! Custom Axum extractors.

pub mod auth;
pub mod client_ip;
pub mod pagination;
pub mod path;
pub mod validated;

pub use auth::AuthUser;
pub use client_ip::ClientIp;
pub use pagination::PaginationParams;
pub use path::IdPath;
pub use validated::{ApiQuery, ValidatedJson};
