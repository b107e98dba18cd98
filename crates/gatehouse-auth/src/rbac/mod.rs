//! Role-based access control: the authorization engine and the permission
//! tree builder.

pub mod engine;
pub mod tree;

pub use engine::{AuthorizationEngine, Decision};
pub use tree::build_tree;
