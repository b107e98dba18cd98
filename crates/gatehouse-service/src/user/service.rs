//! User CRUD, status changes and password resets performed by admins.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use gatehouse_auth::{PasswordHasher, PasswordPolicy};
use gatehouse_core::config::AuthConfig;
use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_core::types::pagination::{PageRequest, PageResponse};
use gatehouse_database::{Stores, UserStore};
use gatehouse_entity::Status;
use gatehouse_entity::role::Role;
use gatehouse_entity::user::{NewUser, User, UserChanges, UserFilter};

use crate::context::RequestContext;

/// A user together with every role it holds.
#[derive(Debug, Clone, Serialize)]
pub struct UserWithRoles {
    #[serde(flatten)]
    pub user: User,
    pub roles: Vec<Role>,
}

/// Data for creating a user from the admin panel.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserInput {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub real_name: Option<String>,
    pub status: Option<Status>,
    pub role_ids: Vec<i64>,
}

/// Partial update. `role_ids`, when present, replaces the whole set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserInput {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub real_name: Option<String>,
    pub status: Option<Status>,
    pub role_ids: Option<Vec<i64>>,
}

/// Handles administrative user operations.
#[derive(Debug, Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
    hasher: Arc<PasswordHasher>,
    policy: PasswordPolicy,
}

impl UserService {
    /// Creates a new user service.
    pub fn new(stores: &Stores, hasher: Arc<PasswordHasher>, config: &AuthConfig) -> Self {
        Self {
            users: stores.users.clone(),
            hasher,
            policy: PasswordPolicy::new(config),
        }
    }

    /// Filtered, newest-first page of users with their roles.
    pub async fn list(
        &self,
        filter: &UserFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<UserWithRoles>> {
        let users = self.users.list(filter, page).await?;
        let mut roles = Vec::with_capacity(users.list.len());
        for user in &users.list {
            roles.push(self.users.roles_of(user.id).await?);
        }
        let mut roles = roles.into_iter();
        Ok(users.map(|user| UserWithRoles {
            user,
            roles: roles.next().unwrap_or_default(),
        }))
    }

    pub async fn get(&self, id: i64) -> AppResult<UserWithRoles> {
        let user = self.find(id).await?;
        let roles = self.users.roles_of(id).await?;
        Ok(UserWithRoles { user, roles })
    }

    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: CreateUserInput,
    ) -> AppResult<UserWithRoles> {
        self.policy.validate(&input.password)?;

        if self.users.find_by_username(&input.username).await?.is_some() {
            return Err(AppError::conflict("Username already exists"));
        }
        if let Some(email) = &input.email {
            if self.users.find_by_email(email).await?.is_some() {
                return Err(AppError::conflict("Email already exists"));
            }
        }

        let password_hash = self.hasher.hash_password(&input.password)?;
        let new_user = NewUser {
            username: input.username,
            password_hash,
            email: input.email,
            phone: input.phone,
            real_name: input.real_name,
            status: input.status.unwrap_or_default(),
            created_by: Some(ctx.user_id),
        };
        let user = self
            .users
            .create_with_roles(&new_user, &input.role_ids)
            .await?;

        info!(actor_id = ctx.user_id, user_id = user.id, "User created");
        self.get(user.id).await
    }

    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: i64,
        input: UpdateUserInput,
    ) -> AppResult<UserWithRoles> {
        if ctx.is_self(id) && input.status == Some(Status::Disabled) {
            return Err(AppError::conflict("Cannot disable the current user"));
        }
        self.find(id).await?;

        if let Some(email) = &input.email {
            if let Some(existing) = self.users.find_by_email(email).await? {
                if existing.id != id {
                    return Err(AppError::conflict("Email already exists"));
                }
            }
        }

        let changes = UserChanges {
            email: input.email,
            phone: input.phone,
            real_name: input.real_name,
            status: input.status,
            updated_by: Some(ctx.user_id),
        };
        self.users
            .update_with_roles(id, &changes, input.role_ids.as_deref())
            .await?;

        info!(actor_id = ctx.user_id, user_id = id, "User updated");
        self.get(id).await
    }

    pub async fn delete(&self, ctx: &RequestContext, id: i64) -> AppResult<()> {
        if ctx.is_self(id) {
            return Err(AppError::conflict("Cannot delete the current user"));
        }
        if !self.users.delete(id).await? {
            return Err(AppError::not_found("User not found"));
        }
        info!(actor_id = ctx.user_id, user_id = id, "User deleted");
        Ok(())
    }

    /// Set the status. Setting the current value again is a no-op success.
    pub async fn change_status(
        &self,
        ctx: &RequestContext,
        id: i64,
        status: Status,
    ) -> AppResult<User> {
        if ctx.is_self(id) {
            return Err(AppError::conflict("Cannot change the status of the current user"));
        }
        let changes = UserChanges {
            status: Some(status),
            updated_by: Some(ctx.user_id),
            ..UserChanges::default()
        };
        let user = self.users.update(id, &changes).await?;
        info!(actor_id = ctx.user_id, user_id = id, %status, "User status changed");
        Ok(user)
    }

    pub async fn reset_password(
        &self,
        ctx: &RequestContext,
        id: i64,
        new_password: &str,
    ) -> AppResult<()> {
        self.policy.validate(new_password)?;
        self.find(id).await?;

        let hash = self.hasher.hash_password(new_password)?;
        self.users.update_password(id, &hash, ctx.user_id).await?;

        info!(actor_id = ctx.user_id, user_id = id, "Password reset");
        Ok(())
    }

    async fn find(&self, id: i64) -> AppResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }
}
