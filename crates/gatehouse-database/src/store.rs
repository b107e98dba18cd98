//! Store traits for the RBAC repository.
//!
//! The authorization engine and the services depend on these traits, never
//! on a concrete pool, so that tests can run against [`crate::MemoryStore`].
//! Implementations map uniqueness violations to `ErrorKind::Conflict`,
//! references to missing rows to `ErrorKind::Validation`, and every other
//! backing-store failure to `ErrorKind::Database`.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use gatehouse_core::result::AppResult;
use gatehouse_core::types::pagination::{PageRequest, PageResponse};
use gatehouse_entity::operation_log::{NewOperationLog, OperationLog, OperationLogFilter};
use gatehouse_entity::permission::{NewPermission, Permission, PermissionChanges};
use gatehouse_entity::role::{NewRole, Role, RoleChanges, RoleFilter};
use gatehouse_entity::user::{NewUser, User, UserChanges, UserFilter};

use crate::memory::MemoryStore;
use crate::repositories::{
    OperationLogRepository, PermissionRepository, RoleRepository, UserRepository,
};

/// User accounts and their role memberships.
#[async_trait]
pub trait UserStore: Send + Sync + Debug + 'static {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Filtered page ordered by `created_at DESC, id DESC`.
    async fn list(&self, filter: &UserFilter, page: &PageRequest) -> AppResult<PageResponse<User>>;

    async fn create(&self, user: &NewUser) -> AppResult<User> {
        self.create_with_roles(user, &[]).await
    }

    /// Insert the user together with its memberships. Nothing is written
    /// when any role id does not exist.
    async fn create_with_roles(&self, user: &NewUser, role_ids: &[i64]) -> AppResult<User>;

    /// Apply a partial update. Missing rows are `NotFound`.
    async fn update(&self, id: i64, changes: &UserChanges) -> AppResult<User> {
        self.update_with_roles(id, changes, None).await
    }

    /// Apply `changes` and, when `role_ids` is given, replace the memberships
    /// with it. Either both take effect or neither does.
    async fn update_with_roles(
        &self,
        id: i64,
        changes: &UserChanges,
        role_ids: Option<&[i64]>,
    ) -> AppResult<User>;

    async fn update_password(&self, id: i64, password_hash: &str, updated_by: i64)
    -> AppResult<()>;

    /// Stamp the last successful login.
    async fn record_login(&self, id: i64, ip: &str) -> AppResult<()>;

    /// Delete a user and its memberships. Returns `false` if absent.
    async fn delete(&self, id: i64) -> AppResult<bool>;

    async fn count(&self) -> AppResult<u64>;

    /// Every role the user holds, enabled or not, ordered by id.
    async fn roles_of(&self, user_id: i64) -> AppResult<Vec<Role>>;

    /// Replace the user's memberships with exactly `role_ids`.
    async fn replace_roles(&self, user_id: i64, role_ids: &[i64], acting: Option<i64>)
    -> AppResult<()>;
}

/// Roles and their permission grants.
#[async_trait]
pub trait RoleStore: Send + Sync + Debug + 'static {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Role>>;

    async fn find_by_code(&self, code: &str) -> AppResult<Option<Role>>;

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>>;

    /// Filtered page ordered by `created_at DESC, id DESC`.
    async fn list(&self, filter: &RoleFilter, page: &PageRequest) -> AppResult<PageResponse<Role>>;

    /// Enabled roles ordered by id.
    async fn list_enabled(&self) -> AppResult<Vec<Role>>;

    async fn create(&self, role: &NewRole) -> AppResult<Role> {
        self.create_with_permissions(role, &[]).await
    }

    /// Insert the role together with its grants, all or nothing.
    async fn create_with_permissions(
        &self,
        role: &NewRole,
        permission_ids: &[i64],
    ) -> AppResult<Role>;

    async fn update(&self, id: i64, changes: &RoleChanges) -> AppResult<Role> {
        self.update_with_permissions(id, changes, None).await
    }

    /// Apply `changes` and optionally replace the grants, all or nothing.
    async fn update_with_permissions(
        &self,
        id: i64,
        changes: &RoleChanges,
        permission_ids: Option<&[i64]>,
    ) -> AppResult<Role>;

    async fn delete(&self, id: i64) -> AppResult<bool>;

    async fn count(&self) -> AppResult<u64>;

    /// Permissions granted to the role ordered by `(sort_order, id)`.
    async fn permissions_of(&self, role_id: i64) -> AppResult<Vec<Permission>>;

    /// Replace the role's grants with exactly `permission_ids`.
    async fn replace_permissions(
        &self,
        role_id: i64,
        permission_ids: &[i64],
        acting: Option<i64>,
    ) -> AppResult<()>;

    /// Number of users holding the role.
    async fn user_count(&self, role_id: i64) -> AppResult<u64>;
}

/// Permission rows and the authorization join.
#[async_trait]
pub trait PermissionStore: Send + Sync + Debug + 'static {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Permission>>;

    async fn find_by_code(&self, code: &str) -> AppResult<Option<Permission>>;

    /// Every permission ordered by `(sort_order, id)`.
    async fn list_all(&self) -> AppResult<Vec<Permission>>;

    async fn create(&self, permission: &NewPermission) -> AppResult<Permission>;

    async fn update(&self, id: i64, changes: &PermissionChanges) -> AppResult<Permission>;

    async fn delete(&self, id: i64) -> AppResult<bool>;

    async fn count(&self) -> AppResult<u64>;

    /// Number of direct children.
    async fn child_count(&self, id: i64) -> AppResult<u64>;

    /// Whether an enabled user holds an enabled role granting an enabled
    /// permission with `code`.
    async fn has_grant(&self, user_id: i64, code: &str) -> AppResult<bool>;

    /// Sorted, de-duplicated codes passing the same filters as [`has_grant`](Self::has_grant).
    async fn effective_codes(&self, user_id: i64) -> AppResult<Vec<String>>;
}

/// Append-only operation log.
#[async_trait]
pub trait OperationLogStore: Send + Sync + Debug + 'static {
    /// Insert one entry.
    async fn insert(&self, entry: &NewOperationLog) -> AppResult<()>;

    /// Insert many entries in one statement. Returns rows written.
    async fn insert_batch(&self, entries: &[NewOperationLog]) -> AppResult<u64>;

    async fn find_by_id(&self, id: i64) -> AppResult<Option<OperationLog>>;

    /// Filtered page ordered by `created_at DESC, id DESC`.
    async fn list(
        &self,
        filter: &OperationLogFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<OperationLog>>;

    async fn delete(&self, id: i64) -> AppResult<bool>;

    /// Remove every entry. Returns rows removed.
    async fn clear(&self) -> AppResult<u64>;

    /// Remove entries created before `cutoff`. Returns rows removed.
    async fn purge_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64>;

    async fn count(&self) -> AppResult<u64>;
}

/// The four stores bundled for injection.
#[derive(Debug, Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub roles: Arc<dyn RoleStore>,
    pub permissions: Arc<dyn PermissionStore>,
    pub logs: Arc<dyn OperationLogStore>,
}

impl Stores {
    /// PostgreSQL-backed stores sharing one pool.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(UserRepository::new(pool.clone())),
            roles: Arc::new(RoleRepository::new(pool.clone())),
            permissions: Arc::new(PermissionRepository::new(pool.clone())),
            logs: Arc::new(OperationLogRepository::new(pool)),
        }
    }

    /// All four stores backed by one shared in-memory dataset.
    pub fn memory(store: MemoryStore) -> Self {
        Self {
            users: Arc::new(store.clone()),
            roles: Arc::new(store.clone()),
            permissions: Arc::new(store.clone()),
            logs: Arc::new(store),
        }
    }
}
