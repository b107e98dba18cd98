//! Permission tree node.

use serde::{Deserialize, Serialize};

use super::model::Permission;

/// A permission with its children embedded, for hierarchical display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionNode {
    /// The permission at this position.
    #[serde(flatten)]
    pub permission: Permission,
    /// Direct children, already in display order.
    pub children: Vec<PermissionNode>,
}

impl PermissionNode {
    /// Wrap a permission with no children.
    pub fn leaf(permission: Permission) -> Self {
        Self {
            permission,
            children: Vec::new(),
        }
    }

    /// Total number of nodes in this subtree, including self.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(PermissionNode::size).sum::<usize>()
    }

    /// Depth-first pre-order walk yielding each permission.
    pub fn flatten(&self) -> Vec<&Permission> {
        let mut out = Vec::with_capacity(self.size());
        self.collect_into(&mut out);
        out
    }

    fn collect_into<'a>(&'a self, out: &mut Vec<&'a Permission>) {
        out.push(&self.permission);
        for child in &self.children {
            child.collect_into(out);
        }
    }
}
