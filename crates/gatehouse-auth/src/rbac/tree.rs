//! Builds the nested permission tree from flat rows.

use std::collections::{HashMap, HashSet};

use tracing::warn;

use gatehouse_entity::permission::{Permission, PermissionNode, ROOT_PARENT_ID};

/// Assemble flat permissions into a forest rooted at parent `0`.
///
/// Siblings are ordered by `(sort_order, id)`. Each parent's group is
/// consumed once and each id is emitted once, so cycles and
/// self-references terminate. Rows not reachable from the root are
/// dropped with a warning.
pub fn build_tree(mut flat: Vec<Permission>) -> Vec<PermissionNode> {
    flat.sort_by_key(|p| (p.sort_order, p.id));

    let mut by_parent: HashMap<i64, Vec<Permission>> = HashMap::new();
    for permission in flat {
        by_parent
            .entry(permission.parent_id)
            .or_default()
            .push(permission);
    }

    let mut visited = HashSet::new();
    let roots = attach(ROOT_PARENT_ID, &mut by_parent, &mut visited);

    let mut unreachable: Vec<i64> = by_parent
        .values()
        .flatten()
        .map(|p| p.id)
        .collect();
    if !unreachable.is_empty() {
        unreachable.sort_unstable();
        warn!(
            count = unreachable.len(),
            ids = ?unreachable,
            "Permissions unreachable from the root were left out of the tree"
        );
    }

    roots
}

fn attach(
    parent_id: i64,
    by_parent: &mut HashMap<i64, Vec<Permission>>,
    visited: &mut HashSet<i64>,
) -> Vec<PermissionNode> {
    let Some(group) = by_parent.remove(&parent_id) else {
        return Vec::new();
    };

    let mut nodes = Vec::with_capacity(group.len());
    for permission in group {
        if !visited.insert(permission.id) {
            continue;
        }
        let children = attach(permission.id, by_parent, visited);
        nodes.push(PermissionNode {
            permission,
            children,
        });
    }
    nodes
}
