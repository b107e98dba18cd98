//! In-memory implementation of every store trait.
//!
//! Mirrors the PostgreSQL schema closely enough to stand in for it in
//! tests: unique keys, junction cascades, foreign-key checks and the
//! enabled-on-every-hop grant join all behave the same way. The store can
//! be switched to an unavailable state to exercise backing-store failures.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_core::types::pagination::{PageRequest, PageResponse};
use gatehouse_entity::Status;
use gatehouse_entity::operation_log::{NewOperationLog, OperationLog, OperationLogFilter};
use gatehouse_entity::permission::{
    NewPermission, Permission, PermissionChanges, PermissionType, ROOT_PARENT_ID,
};
use gatehouse_entity::role::{NewRole, Role, RoleChanges, RoleFilter};
use gatehouse_entity::user::{NewUser, User, UserChanges, UserFilter};

use crate::store::{OperationLogStore, PermissionStore, RoleStore, UserStore};

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<i64, User>,
    roles: BTreeMap<i64, Role>,
    permissions: BTreeMap<i64, Permission>,
    user_roles: BTreeSet<(i64, i64)>,
    role_permissions: BTreeSet<(i64, i64)>,
    logs: BTreeMap<i64, OperationLog>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn check_roles(&self, role_ids: &[i64]) -> AppResult<()> {
        if role_ids.iter().all(|rid| self.roles.contains_key(rid)) {
            Ok(())
        } else {
            Err(missing_reference())
        }
    }

    fn check_permissions(&self, permission_ids: &[i64]) -> AppResult<()> {
        if permission_ids.iter().all(|pid| self.permissions.contains_key(pid)) {
            Ok(())
        } else {
            Err(missing_reference())
        }
    }

    fn has_grant(&self, user_id: i64, code: &str) -> bool {
        self.effective_codes(user_id).contains(code)
    }

    fn effective_codes(&self, user_id: i64) -> BTreeSet<String> {
        let enabled_user = self
            .users
            .get(&user_id)
            .is_some_and(|u| u.status.is_enabled());
        if !enabled_user {
            return BTreeSet::new();
        }

        self.user_roles
            .iter()
            .filter(|(uid, _)| *uid == user_id)
            .filter(|(_, rid)| self.roles.get(rid).is_some_and(|r| r.status.is_enabled()))
            .flat_map(|(_, rid)| {
                self.role_permissions
                    .iter()
                    .filter(move |(r, _)| r == rid)
                    .filter_map(|(_, pid)| self.permissions.get(pid))
            })
            .filter(|p| p.status.is_enabled())
            .map(|p| p.permission_code.clone())
            .collect()
    }
}

/// Shared in-memory dataset. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the same built-in permissions and roles the
    /// seed migration installs: `ADMIN` with everything, `USER` with
    /// `dashboard:view`.
    pub async fn with_builtin_rbac() -> AppResult<Self> {
        let store = Self::new();
        let menus = [
            ("Dashboard", "dashboard:view", ROOT_PARENT_ID, 1),
            ("System", "system", ROOT_PARENT_ID, 2),
        ];
        let mut ids = Vec::new();
        for (name, code, parent, sort) in menus {
            let p = PermissionStore::create(&store, &menu(name, code, parent, sort)).await?;
            ids.push(p.id);
        }
        let system_id = ids[1];
        let children = [
            ("Users", "user:manage", 1),
            ("Roles", "role:manage", 2),
            ("Permissions", "permission:manage", 3),
            ("Operation logs", "log:manage", 4),
        ];
        for (name, code, sort) in children {
            let p = PermissionStore::create(&store, &menu(name, code, system_id, sort)).await?;
            ids.push(p.id);
        }

        let admin = RoleStore::create(&store, &builtin_role("Administrator", "ADMIN")).await?;
        store.replace_permissions(admin.id, &ids, None).await?;
        let user = RoleStore::create(&store, &builtin_role("User", "USER")).await?;
        store.replace_permissions(user.id, &ids[..1], None).await?;
        Ok(store)
    }

    /// Make every subsequent call fail with a database error (or recover).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::database("In-memory store is unavailable"));
        }
        Ok(())
    }
}

fn missing_reference() -> AppError {
    AppError::validation("Referenced role or permission does not exist")
}

fn menu(name: &str, code: &str, parent_id: i64, sort_order: i32) -> NewPermission {
    NewPermission {
        permission_name: name.to_string(),
        permission_code: code.to_string(),
        permission_type: PermissionType::Menu,
        parent_id,
        path: None,
        component: None,
        icon: None,
        sort_order,
        description: None,
        status: Status::Enabled,
        created_by: None,
    }
}

fn builtin_role(name: &str, code: &str) -> NewRole {
    NewRole {
        role_name: name.to_string(),
        role_code: code.to_string(),
        description: None,
        status: Status::Enabled,
        created_by: None,
    }
}

fn contains(haystack: Option<&str>, needle: &Option<String>) -> bool {
    match needle {
        None => true,
        Some(n) => haystack.is_some_and(|h| h.contains(n.as_str())),
    }
}

fn page_of<T: Clone>(mut rows: Vec<T>, page: &PageRequest) -> PageResponse<T> {
    let total = rows.len() as u64;
    let start = (page.offset() as usize).min(rows.len());
    let end = (start + page.limit() as usize).min(rows.len());
    let list = rows.drain(start..end).collect();
    PageResponse::new(list, page, total)
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        self.check_available()?;
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.email.as_deref() == Some(email))
            .cloned())
    }

    async fn list(&self, filter: &UserFilter, page: &PageRequest) -> AppResult<PageResponse<User>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let mut rows: Vec<User> = tables
            .users
            .values()
            .filter(|u| contains(Some(&u.username), &filter.username))
            .filter(|u| contains(u.email.as_deref(), &filter.email))
            .filter(|u| filter.status.is_none_or(|s| u.status == s))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(page_of(rows, page))
    }

    async fn create_with_roles(&self, data: &NewUser, role_ids: &[i64]) -> AppResult<User> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == data.username) {
            return Err(AppError::conflict("Username already exists"));
        }
        if data.email.is_some() && tables.users.values().any(|u| u.email == data.email) {
            return Err(AppError::conflict("Email already exists"));
        }
        tables.check_roles(role_ids)?;

        let now = Utc::now();
        let user = User {
            id: tables.next_id(),
            username: data.username.clone(),
            password_hash: data.password_hash.clone(),
            email: data.email.clone(),
            phone: data.phone.clone(),
            real_name: data.real_name.clone(),
            status: data.status,
            last_login_time: None,
            last_login_ip: None,
            created_by: data.created_by,
            updated_by: None,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());
        tables.user_roles.extend(role_ids.iter().map(|rid| (user.id, *rid)));
        Ok(user)
    }

    async fn update_with_roles(
        &self,
        id: i64,
        changes: &UserChanges,
        role_ids: Option<&[i64]>,
    ) -> AppResult<User> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        if let Some(email) = &changes.email {
            let taken = tables
                .users
                .values()
                .any(|u| u.id != id && u.email.as_deref() == Some(email.as_str()));
            if taken {
                return Err(AppError::conflict("Email already exists"));
            }
        }
        if !tables.users.contains_key(&id) {
            return Err(AppError::not_found(format!("User {id} not found")));
        }
        if let Some(role_ids) = role_ids {
            tables.check_roles(role_ids)?;
            tables.user_roles.retain(|(uid, _)| *uid != id);
            tables.user_roles.extend(role_ids.iter().map(|rid| (id, *rid)));
        }

        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;
        if let Some(email) = &changes.email {
            user.email = Some(email.clone());
        }
        if let Some(phone) = &changes.phone {
            user.phone = Some(phone.clone());
        }
        if let Some(real_name) = &changes.real_name {
            user.real_name = Some(real_name.clone());
        }
        if let Some(status) = changes.status {
            user.status = status;
        }
        if changes.updated_by.is_some() {
            user.updated_by = changes.updated_by;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn update_password(
        &self,
        id: i64,
        password_hash: &str,
        updated_by: i64,
    ) -> AppResult<()> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;
        user.password_hash = password_hash.to_string();
        user.updated_by = Some(updated_by);
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn record_login(&self, id: i64, ip: &str) -> AppResult<()> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        if let Some(user) = tables.users.get_mut(&id) {
            user.last_login_time = Some(Utc::now());
            user.last_login_ip = Some(ip.to_string());
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let removed = tables.users.remove(&id).is_some();
        tables.user_roles.retain(|(uid, _)| *uid != id);
        Ok(removed)
    }

    async fn count(&self) -> AppResult<u64> {
        self.check_available()?;
        Ok(self.tables.read().await.users.len() as u64)
    }

    async fn roles_of(&self, user_id: i64) -> AppResult<Vec<Role>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .user_roles
            .iter()
            .filter(|(uid, _)| *uid == user_id)
            .filter_map(|(_, rid)| tables.roles.get(rid).cloned())
            .collect())
    }

    async fn replace_roles(
        &self,
        user_id: i64,
        role_ids: &[i64],
        _acting: Option<i64>,
    ) -> AppResult<()> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user_id) {
            return Err(missing_reference());
        }
        tables.check_roles(role_ids)?;
        tables.user_roles.retain(|(uid, _)| *uid != user_id);
        tables.user_roles.extend(role_ids.iter().map(|rid| (user_id, *rid)));
        Ok(())
    }
}

#[async_trait]
impl RoleStore for MemoryStore {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Role>> {
        self.check_available()?;
        Ok(self.tables.read().await.roles.get(&id).cloned())
    }

    async fn find_by_code(&self, code: &str) -> AppResult<Option<Role>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables.roles.values().find(|r| r.role_code == code).cloned())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables.roles.values().find(|r| r.role_name == name).cloned())
    }

    async fn list(&self, filter: &RoleFilter, page: &PageRequest) -> AppResult<PageResponse<Role>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let mut rows: Vec<Role> = tables
            .roles
            .values()
            .filter(|r| contains(Some(&r.role_name), &filter.role_name))
            .filter(|r| filter.status.is_none_or(|s| r.status == s))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(page_of(rows, page))
    }

    async fn list_enabled(&self) -> AppResult<Vec<Role>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .roles
            .values()
            .filter(|r| r.status.is_enabled())
            .cloned()
            .collect())
    }

    async fn create_with_permissions(
        &self,
        data: &NewRole,
        permission_ids: &[i64],
    ) -> AppResult<Role> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let duplicate = tables
            .roles
            .values()
            .any(|r| r.role_name == data.role_name || r.role_code == data.role_code);
        if duplicate {
            return Err(AppError::conflict("Role name or role code already exists"));
        }
        tables.check_permissions(permission_ids)?;

        let now = Utc::now();
        let role = Role {
            id: tables.next_id(),
            role_name: data.role_name.clone(),
            role_code: data.role_code.clone(),
            description: data.description.clone(),
            status: data.status,
            created_by: data.created_by,
            updated_by: None,
            created_at: now,
            updated_at: now,
        };
        tables.roles.insert(role.id, role.clone());
        tables
            .role_permissions
            .extend(permission_ids.iter().map(|pid| (role.id, *pid)));
        Ok(role)
    }

    async fn update_with_permissions(
        &self,
        id: i64,
        changes: &RoleChanges,
        permission_ids: Option<&[i64]>,
    ) -> AppResult<Role> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        if let Some(name) = &changes.role_name {
            if tables.roles.values().any(|r| r.id != id && &r.role_name == name) {
                return Err(AppError::conflict("Role name or role code already exists"));
            }
        }
        if !tables.roles.contains_key(&id) {
            return Err(AppError::not_found(format!("Role {id} not found")));
        }
        if let Some(permission_ids) = permission_ids {
            tables.check_permissions(permission_ids)?;
            tables.role_permissions.retain(|(rid, _)| *rid != id);
            tables
                .role_permissions
                .extend(permission_ids.iter().map(|pid| (id, *pid)));
        }

        let role = tables
            .roles
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Role {id} not found")))?;
        if let Some(name) = &changes.role_name {
            role.role_name = name.clone();
        }
        if let Some(description) = &changes.description {
            role.description = Some(description.clone());
        }
        if let Some(status) = changes.status {
            role.status = status;
        }
        if changes.updated_by.is_some() {
            role.updated_by = changes.updated_by;
        }
        role.updated_at = Utc::now();
        Ok(role.clone())
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let removed = tables.roles.remove(&id).is_some();
        tables.user_roles.retain(|(_, rid)| *rid != id);
        tables.role_permissions.retain(|(rid, _)| *rid != id);
        Ok(removed)
    }

    async fn count(&self) -> AppResult<u64> {
        self.check_available()?;
        Ok(self.tables.read().await.roles.len() as u64)
    }

    async fn permissions_of(&self, role_id: i64) -> AppResult<Vec<Permission>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let mut rows: Vec<Permission> = tables
            .role_permissions
            .iter()
            .filter(|(rid, _)| *rid == role_id)
            .filter_map(|(_, pid)| tables.permissions.get(pid).cloned())
            .collect();
        rows.sort_by_key(|p| (p.sort_order, p.id));
        Ok(rows)
    }

    async fn replace_permissions(
        &self,
        role_id: i64,
        permission_ids: &[i64],
        _acting: Option<i64>,
    ) -> AppResult<()> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        if !tables.roles.contains_key(&role_id) {
            return Err(missing_reference());
        }
        tables.check_permissions(permission_ids)?;
        tables.role_permissions.retain(|(rid, _)| *rid != role_id);
        tables
            .role_permissions
            .extend(permission_ids.iter().map(|pid| (role_id, *pid)));
        Ok(())
    }

    async fn user_count(&self, role_id: i64) -> AppResult<u64> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .user_roles
            .iter()
            .filter(|(_, rid)| *rid == role_id)
            .count() as u64)
    }
}

#[async_trait]
impl PermissionStore for MemoryStore {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Permission>> {
        self.check_available()?;
        Ok(self.tables.read().await.permissions.get(&id).cloned())
    }

    async fn find_by_code(&self, code: &str) -> AppResult<Option<Permission>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .permissions
            .values()
            .find(|p| p.permission_code == code)
            .cloned())
    }

    async fn list_all(&self) -> AppResult<Vec<Permission>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let mut rows: Vec<Permission> = tables.permissions.values().cloned().collect();
        rows.sort_by_key(|p| (p.sort_order, p.id));
        Ok(rows)
    }

    async fn create(&self, data: &NewPermission) -> AppResult<Permission> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        if tables
            .permissions
            .values()
            .any(|p| p.permission_code == data.permission_code)
        {
            return Err(AppError::conflict("Permission code already exists"));
        }

        let now = Utc::now();
        let permission = Permission {
            id: tables.next_id(),
            permission_name: data.permission_name.clone(),
            permission_code: data.permission_code.clone(),
            permission_type: data.permission_type,
            parent_id: data.parent_id,
            path: data.path.clone(),
            component: data.component.clone(),
            icon: data.icon.clone(),
            sort_order: data.sort_order,
            description: data.description.clone(),
            status: data.status,
            created_by: data.created_by,
            updated_by: None,
            created_at: now,
            updated_at: now,
        };
        tables.permissions.insert(permission.id, permission.clone());
        Ok(permission)
    }

    async fn update(&self, id: i64, changes: &PermissionChanges) -> AppResult<Permission> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let p = tables
            .permissions
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Permission {id} not found")))?;
        if let Some(name) = &changes.permission_name {
            p.permission_name = name.clone();
        }
        if let Some(kind) = changes.permission_type {
            p.permission_type = kind;
        }
        if let Some(parent_id) = changes.parent_id {
            p.parent_id = parent_id;
        }
        if let Some(path) = &changes.path {
            p.path = Some(path.clone());
        }
        if let Some(component) = &changes.component {
            p.component = Some(component.clone());
        }
        if let Some(icon) = &changes.icon {
            p.icon = Some(icon.clone());
        }
        if let Some(sort_order) = changes.sort_order {
            p.sort_order = sort_order;
        }
        if let Some(description) = &changes.description {
            p.description = Some(description.clone());
        }
        if let Some(status) = changes.status {
            p.status = status;
        }
        if changes.updated_by.is_some() {
            p.updated_by = changes.updated_by;
        }
        p.updated_at = Utc::now();
        Ok(p.clone())
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let removed = tables.permissions.remove(&id).is_some();
        tables.role_permissions.retain(|(_, pid)| *pid != id);
        Ok(removed)
    }

    async fn count(&self) -> AppResult<u64> {
        self.check_available()?;
        Ok(self.tables.read().await.permissions.len() as u64)
    }

    async fn child_count(&self, id: i64) -> AppResult<u64> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .permissions
            .values()
            .filter(|p| p.parent_id == id)
            .count() as u64)
    }

    async fn has_grant(&self, user_id: i64, code: &str) -> AppResult<bool> {
        self.check_available()?;
        Ok(self.tables.read().await.has_grant(user_id, code))
    }

    async fn effective_codes(&self, user_id: i64) -> AppResult<Vec<String>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables.effective_codes(user_id).into_iter().collect())
    }
}

#[async_trait]
impl OperationLogStore for MemoryStore {
    async fn insert(&self, entry: &NewOperationLog) -> AppResult<()> {
        self.insert_batch(std::slice::from_ref(entry)).await.map(|_| ())
    }

    async fn insert_batch(&self, entries: &[NewOperationLog]) -> AppResult<u64> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        for e in entries {
            let id = tables.next_id();
            tables.logs.insert(
                id,
                OperationLog {
                    id,
                    user_id: e.user_id,
                    username: e.username.clone(),
                    operation: e.operation.clone(),
                    method: e.method.clone(),
                    url: e.url.clone(),
                    ip: e.ip.clone(),
                    params: e.params.clone(),
                    result: e.result.clone(),
                    status: e.status,
                    error_msg: e.error_msg.clone(),
                    execute_time: e.execute_time,
                    created_at: e.created_at,
                },
            );
        }
        Ok(entries.len() as u64)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<OperationLog>> {
        self.check_available()?;
        Ok(self.tables.read().await.logs.get(&id).cloned())
    }

    async fn list(
        &self,
        filter: &OperationLogFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<OperationLog>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let mut rows: Vec<OperationLog> = tables
            .logs
            .values()
            .filter(|l| contains(l.username.as_deref(), &filter.username))
            .filter(|l| contains(Some(&l.operation), &filter.operation))
            .filter(|l| filter.status.is_none_or(|s| l.status == s))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(page_of(rows, page))
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        self.check_available()?;
        Ok(self.tables.write().await.logs.remove(&id).is_some())
    }

    async fn clear(&self) -> AppResult<u64> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let removed = tables.logs.len() as u64;
        tables.logs.clear();
        Ok(removed)
    }

    async fn purge_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let before = tables.logs.len();
        tables.logs.retain(|_, l| l.created_at >= cutoff);
        Ok((before - tables.logs.len()) as u64)
    }

    async fn count(&self) -> AppResult<u64> {
        self.check_available()?;
        Ok(self.tables.read().await.logs.len() as u64)
    }
}
