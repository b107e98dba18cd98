//! Permission domain entities: flat rows, the node type and the kind enum.

pub mod kind;
pub mod model;
pub mod node;

pub use kind::PermissionType;
pub use model::{NewPermission, Permission, PermissionChanges, ROOT_PARENT_ID};
pub use node::PermissionNode;
