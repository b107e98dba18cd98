//! Role CRUD with permission-set replacement.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_core::types::pagination::{PageRequest, PageResponse};
use gatehouse_database::{RoleStore, Stores};
use gatehouse_entity::Status;
use gatehouse_entity::permission::Permission;
use gatehouse_entity::role::{NewRole, Role, RoleChanges, RoleFilter};

use crate::context::RequestContext;

/// A role together with the permissions it grants.
#[derive(Debug, Clone, Serialize)]
pub struct RoleWithPermissions {
    #[serde(flatten)]
    pub role: Role,
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoleInput {
    pub role_name: String,
    pub role_code: String,
    pub description: Option<String>,
    pub status: Option<Status>,
    pub permission_ids: Vec<i64>,
}

/// Partial update. The role code cannot change once created.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRoleInput {
    pub role_name: Option<String>,
    pub description: Option<String>,
    pub status: Option<Status>,
    pub permission_ids: Option<Vec<i64>>,
}

/// Handles role administration.
#[derive(Debug, Clone)]
pub struct RoleService {
    roles: Arc<dyn RoleStore>,
}

impl RoleService {
    pub fn new(stores: &Stores) -> Self {
        Self {
            roles: stores.roles.clone(),
        }
    }

    pub async fn list(
        &self,
        filter: &RoleFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<RoleWithPermissions>> {
        let roles = self.roles.list(filter, page).await?;
        let mut grants = Vec::with_capacity(roles.list.len());
        for role in &roles.list {
            grants.push(self.roles.permissions_of(role.id).await?);
        }
        let mut grants = grants.into_iter();
        Ok(roles.map(|role| RoleWithPermissions {
            role,
            permissions: grants.next().unwrap_or_default(),
        }))
    }

    /// Enabled roles ordered by id, for assignment pickers.
    pub async fn all(&self) -> AppResult<Vec<Role>> {
        self.roles.list_enabled().await
    }

    pub async fn get(&self, id: i64) -> AppResult<RoleWithPermissions> {
        let role = self.find(id).await?;
        let permissions = self.roles.permissions_of(id).await?;
        Ok(RoleWithPermissions { role, permissions })
    }

    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: CreateRoleInput,
    ) -> AppResult<RoleWithPermissions> {
        let name_taken = self.roles.find_by_name(&input.role_name).await?.is_some();
        let code_taken = self.roles.find_by_code(&input.role_code).await?.is_some();
        if name_taken || code_taken {
            return Err(AppError::conflict("Role name or role code already exists"));
        }

        let new_role = NewRole {
            role_name: input.role_name,
            role_code: input.role_code,
            description: input.description,
            status: input.status.unwrap_or_default(),
            created_by: Some(ctx.user_id),
        };
        let role = self
            .roles
            .create_with_permissions(&new_role, &input.permission_ids)
            .await?;

        info!(actor_id = ctx.user_id, role_id = role.id, code = %role.role_code, "Role created");
        self.get(role.id).await
    }

    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: i64,
        input: UpdateRoleInput,
    ) -> AppResult<RoleWithPermissions> {
        self.find(id).await?;

        if let Some(name) = &input.role_name {
            if let Some(existing) = self.roles.find_by_name(name).await? {
                if existing.id != id {
                    return Err(AppError::conflict("Role name or role code already exists"));
                }
            }
        }

        let changes = RoleChanges {
            role_name: input.role_name,
            description: input.description,
            status: input.status,
            updated_by: Some(ctx.user_id),
        };
        self.roles
            .update_with_permissions(id, &changes, input.permission_ids.as_deref())
            .await?;

        info!(actor_id = ctx.user_id, role_id = id, "Role updated");
        self.get(id).await
    }

    /// Deletes a role that no user holds.
    pub async fn delete(&self, ctx: &RequestContext, id: i64) -> AppResult<()> {
        self.find(id).await?;
        if self.roles.user_count(id).await? > 0 {
            return Err(AppError::conflict(
                "Role is still assigned to users and cannot be deleted",
            ));
        }
        self.roles.delete(id).await?;
        info!(actor_id = ctx.user_id, role_id = id, "Role deleted");
        Ok(())
    }

    async fn find(&self, id: i64) -> AppResult<Role> {
        self.roles
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Role not found"))
    }
}
