//! Permission CRUD with hierarchy checks.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use gatehouse_auth::build_tree;
use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_database::{PermissionStore, Stores};
use gatehouse_entity::Status;
use gatehouse_entity::permission::{
    NewPermission, Permission, PermissionChanges, PermissionNode, PermissionType, ROOT_PARENT_ID,
};

use crate::context::RequestContext;

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePermissionInput {
    pub permission_name: String,
    pub permission_code: String,
    pub permission_type: Option<PermissionType>,
    pub parent_id: Option<i64>,
    pub path: Option<String>,
    pub component: Option<String>,
    pub icon: Option<String>,
    pub sort_order: Option<i32>,
    pub description: Option<String>,
    pub status: Option<Status>,
}

/// Partial update. The permission code cannot change once created.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePermissionInput {
    pub permission_name: Option<String>,
    pub permission_type: Option<PermissionType>,
    pub parent_id: Option<i64>,
    pub path: Option<String>,
    pub component: Option<String>,
    pub icon: Option<String>,
    pub sort_order: Option<i32>,
    pub description: Option<String>,
    pub status: Option<Status>,
}

/// Handles permission administration.
#[derive(Debug, Clone)]
pub struct PermissionService {
    permissions: Arc<dyn PermissionStore>,
}

impl PermissionService {
    pub fn new(stores: &Stores) -> Self {
        Self {
            permissions: stores.permissions.clone(),
        }
    }

    /// Every permission nested under its parent.
    pub async fn tree(&self) -> AppResult<Vec<PermissionNode>> {
        Ok(build_tree(self.permissions.list_all().await?))
    }

    /// Every permission ordered by `(sort_order, id)`.
    pub async fn all(&self) -> AppResult<Vec<Permission>> {
        self.permissions.list_all().await
    }

    pub async fn get(&self, id: i64) -> AppResult<Permission> {
        self.permissions
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Permission not found"))
    }

    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: CreatePermissionInput,
    ) -> AppResult<Permission> {
        if self
            .permissions
            .find_by_code(&input.permission_code)
            .await?
            .is_some()
        {
            return Err(AppError::conflict("Permission code already exists"));
        }

        let parent_id = input.parent_id.unwrap_or(ROOT_PARENT_ID);
        self.ensure_parent_exists(parent_id).await?;

        let permission = self
            .permissions
            .create(&NewPermission {
                permission_name: input.permission_name,
                permission_code: input.permission_code,
                permission_type: input.permission_type.unwrap_or_default(),
                parent_id,
                path: input.path,
                component: input.component,
                icon: input.icon,
                sort_order: input.sort_order.unwrap_or_default(),
                description: input.description,
                status: input.status.unwrap_or_default(),
                created_by: Some(ctx.user_id),
            })
            .await?;

        info!(
            actor_id = ctx.user_id,
            permission_id = permission.id,
            code = %permission.permission_code,
            "Permission created"
        );
        Ok(permission)
    }

    /// Applies a partial update, refusing a parent that would close a cycle.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: i64,
        input: UpdatePermissionInput,
    ) -> AppResult<Permission> {
        self.get(id).await?;

        if let Some(parent_id) = input.parent_id {
            self.ensure_parent_exists(parent_id).await?;
            self.ensure_acyclic(id, parent_id).await?;
        }

        let changes = PermissionChanges {
            permission_name: input.permission_name,
            permission_type: input.permission_type,
            parent_id: input.parent_id,
            path: input.path,
            component: input.component,
            icon: input.icon,
            sort_order: input.sort_order,
            description: input.description,
            status: input.status,
            updated_by: Some(ctx.user_id),
        };
        let permission = self.permissions.update(id, &changes).await?;

        info!(actor_id = ctx.user_id, permission_id = id, "Permission updated");
        Ok(permission)
    }

    /// Deletes a permission without children. Its grants go with it.
    pub async fn delete(&self, ctx: &RequestContext, id: i64) -> AppResult<()> {
        self.get(id).await?;
        if self.permissions.child_count(id).await? > 0 {
            return Err(AppError::conflict(
                "Permission has child permissions and cannot be deleted",
            ));
        }
        self.permissions.delete(id).await?;
        info!(actor_id = ctx.user_id, permission_id = id, "Permission deleted");
        Ok(())
    }

    async fn ensure_parent_exists(&self, parent_id: i64) -> AppResult<()> {
        if parent_id == ROOT_PARENT_ID {
            return Ok(());
        }
        if self.permissions.find_by_id(parent_id).await?.is_none() {
            return Err(AppError::validation("Parent permission does not exist"));
        }
        Ok(())
    }

    /// Walks the ancestors of `parent_id` and fails if `id` is among them.
    async fn ensure_acyclic(&self, id: i64, parent_id: i64) -> AppResult<()> {
        if parent_id == id {
            return Err(AppError::validation("A permission cannot be its own parent"));
        }

        let parents: HashMap<i64, i64> = self
            .permissions
            .list_all()
            .await?
            .into_iter()
            .map(|p| (p.id, p.parent_id))
            .collect();

        let mut seen = HashSet::new();
        let mut current = parent_id;
        while current != ROOT_PARENT_ID && seen.insert(current) {
            if current == id {
                return Err(AppError::validation(
                    "A permission cannot be moved under its own descendant",
                ));
            }
            match parents.get(&current) {
                Some(next) => current = *next,
                None => break,
            }
        }
        Ok(())
    }
}
