//! Permission repository implementation, including the authorization join.

use async_trait::async_trait;
use sqlx::PgPool;

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_entity::permission::{NewPermission, Permission, PermissionChanges};

use super::{read_error, write_error};
use crate::store::PermissionStore;

/// User → role → permission join restricted to enabled rows on every hop.
const GRANT_JOIN: &str = "FROM users u \
     INNER JOIN user_roles ur ON ur.user_id = u.id \
     INNER JOIN roles r ON r.id = ur.role_id \
     INNER JOIN role_permissions rp ON rp.role_id = r.id \
     INNER JOIN permissions p ON p.id = rp.permission_id \
     WHERE u.id = $1 \
       AND u.status = 'enabled' AND r.status = 'enabled' AND p.status = 'enabled'";

/// Repository for permission rows.
#[derive(Debug, Clone)]
pub struct PermissionRepository {
    pool: PgPool,
}

impl PermissionRepository {
    /// Create a new permission repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PermissionStore for PermissionRepository {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Permission>> {
        sqlx::query_as::<_, Permission>("SELECT * FROM permissions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(read_error("Failed to find permission by id"))
    }

    async fn find_by_code(&self, code: &str) -> AppResult<Option<Permission>> {
        sqlx::query_as::<_, Permission>("SELECT * FROM permissions WHERE permission_code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(read_error("Failed to find permission by code"))
    }

    async fn list_all(&self) -> AppResult<Vec<Permission>> {
        sqlx::query_as::<_, Permission>("SELECT * FROM permissions ORDER BY sort_order, id")
            .fetch_all(&self.pool)
            .await
            .map_err(read_error("Failed to list permissions"))
    }

    async fn create(&self, data: &NewPermission) -> AppResult<Permission> {
        sqlx::query_as::<_, Permission>(
            "INSERT INTO permissions (permission_name, permission_code, permission_type, parent_id, \
             path, component, icon, sort_order, description, status, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING *",
        )
        .bind(&data.permission_name)
        .bind(&data.permission_code)
        .bind(data.permission_type)
        .bind(data.parent_id)
        .bind(&data.path)
        .bind(&data.component)
        .bind(&data.icon)
        .bind(data.sort_order)
        .bind(&data.description)
        .bind(data.status)
        .bind(data.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(write_error("Failed to create permission"))
    }

    async fn update(&self, id: i64, changes: &PermissionChanges) -> AppResult<Permission> {
        sqlx::query_as::<_, Permission>(
            "UPDATE permissions SET permission_name = COALESCE($2, permission_name), \
             permission_type = COALESCE($3, permission_type), parent_id = COALESCE($4, parent_id), \
             path = COALESCE($5, path), component = COALESCE($6, component), \
             icon = COALESCE($7, icon), sort_order = COALESCE($8, sort_order), \
             description = COALESCE($9, description), status = COALESCE($10, status), \
             updated_by = COALESCE($11, updated_by), updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&changes.permission_name)
        .bind(changes.permission_type)
        .bind(changes.parent_id)
        .bind(&changes.path)
        .bind(&changes.component)
        .bind(&changes.icon)
        .bind(changes.sort_order)
        .bind(&changes.description)
        .bind(changes.status)
        .bind(changes.updated_by)
        .fetch_optional(&self.pool)
        .await
        .map_err(write_error("Failed to update permission"))?
        .ok_or_else(|| AppError::not_found(format!("Permission {id} not found")))
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM permissions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(write_error("Failed to delete permission"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> AppResult<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM permissions")
            .fetch_one(&self.pool)
            .await
            .map_err(read_error("Failed to count permissions"))?;
        Ok(total as u64)
    }

    async fn child_count(&self, id: i64) -> AppResult<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM permissions WHERE parent_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(read_error("Failed to count child permissions"))?;
        Ok(total as u64)
    }

    async fn has_grant(&self, user_id: i64, code: &str) -> AppResult<bool> {
        let sql = format!("SELECT EXISTS (SELECT 1 {GRANT_JOIN} AND p.permission_code = $2)");
        sqlx::query_scalar::<_, bool>(&sql)
            .bind(user_id)
            .bind(code)
            .fetch_one(&self.pool)
            .await
            .map_err(read_error("Failed to evaluate permission grant"))
    }

    async fn effective_codes(&self, user_id: i64) -> AppResult<Vec<String>> {
        let sql = format!(
            "SELECT DISTINCT p.permission_code {GRANT_JOIN} ORDER BY p.permission_code"
        );
        sqlx::query_scalar::<_, String>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(read_error("Failed to load effective permissions"))
    }
}
