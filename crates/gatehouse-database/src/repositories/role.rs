//! Role repository implementation.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_core::types::pagination::{PageRequest, PageResponse};
use gatehouse_entity::permission::Permission;
use gatehouse_entity::role::{NewRole, Role, RoleChanges, RoleFilter};

use super::{LIKE_ESCAPE, like_pattern, read_error, write_error};
use crate::store::RoleStore;

/// Repository for roles and their permission grants.
#[derive(Debug, Clone)]
pub struct RoleRepository {
    pool: PgPool,
}

impl RoleRepository {
    /// Create a new role repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &RoleFilter) {
    qb.push(" WHERE TRUE");
    if let Some(name) = &filter.role_name {
        qb.push(" AND role_name LIKE ")
            .push_bind(like_pattern(name))
            .push(LIKE_ESCAPE);
    }
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status);
    }
}

#[async_trait]
impl RoleStore for RoleRepository {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(read_error("Failed to find role by id"))
    }

    async fn find_by_code(&self, code: &str) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE role_code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(read_error("Failed to find role by code"))
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE role_name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(read_error("Failed to find role by name"))
    }

    async fn list(&self, filter: &RoleFilter, page: &PageRequest) -> AppResult<PageResponse<Role>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM roles");
        push_filter(&mut count, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(read_error("Failed to count roles"))?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM roles");
        push_filter(&mut select, filter);
        select
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(page.limit() as i64)
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);
        let roles = select
            .build_query_as::<Role>()
            .fetch_all(&self.pool)
            .await
            .map_err(read_error("Failed to list roles"))?;

        Ok(PageResponse::new(roles, page, total as u64))
    }

    async fn list_enabled(&self) -> AppResult<Vec<Role>> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE status = 'enabled' ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(read_error("Failed to list enabled roles"))
    }

    async fn create_with_permissions(
        &self,
        data: &NewRole,
        permission_ids: &[i64],
    ) -> AppResult<Role> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(read_error("Failed to begin transaction"))?;

        let role = sqlx::query_as::<_, Role>(
            "INSERT INTO roles (role_name, role_code, description, status, created_by) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(&data.role_name)
        .bind(&data.role_code)
        .bind(&data.description)
        .bind(data.status)
        .bind(data.created_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(write_error("Failed to create role"))?;

        if !permission_ids.is_empty() {
            grant_permissions(&mut tx, role.id, permission_ids, data.created_by).await?;
        }

        tx.commit()
            .await
            .map_err(write_error("Failed to commit new role"))?;
        Ok(role)
    }

    async fn update_with_permissions(
        &self,
        id: i64,
        changes: &RoleChanges,
        permission_ids: Option<&[i64]>,
    ) -> AppResult<Role> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(read_error("Failed to begin transaction"))?;

        let role = sqlx::query_as::<_, Role>(
            "UPDATE roles SET role_name = COALESCE($2, role_name), \
             description = COALESCE($3, description), status = COALESCE($4, status), \
             updated_by = COALESCE($5, updated_by), updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&changes.role_name)
        .bind(&changes.description)
        .bind(changes.status)
        .bind(changes.updated_by)
        .fetch_optional(&mut *tx)
        .await
        .map_err(write_error("Failed to update role"))?
        .ok_or_else(|| AppError::not_found(format!("Role {id} not found")))?;

        if let Some(permission_ids) = permission_ids {
            grant_permissions(&mut tx, id, permission_ids, changes.updated_by).await?;
        }

        tx.commit()
            .await
            .map_err(write_error("Failed to commit role update"))?;
        Ok(role)
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(write_error("Failed to delete role"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> AppResult<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM roles")
            .fetch_one(&self.pool)
            .await
            .map_err(read_error("Failed to count roles"))?;
        Ok(total as u64)
    }

    async fn permissions_of(&self, role_id: i64) -> AppResult<Vec<Permission>> {
        sqlx::query_as::<_, Permission>(
            "SELECT p.* FROM permissions p \
             INNER JOIN role_permissions rp ON rp.permission_id = p.id \
             WHERE rp.role_id = $1 ORDER BY p.sort_order, p.id",
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await
        .map_err(read_error("Failed to load role permissions"))
    }

    async fn replace_permissions(
        &self,
        role_id: i64,
        permission_ids: &[i64],
        acting: Option<i64>,
    ) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(read_error("Failed to begin transaction"))?;
        grant_permissions(&mut tx, role_id, permission_ids, acting).await?;
        tx.commit()
            .await
            .map_err(write_error("Failed to commit role permissions"))
    }

    async fn user_count(&self, role_id: i64) -> AppResult<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_roles WHERE role_id = $1")
            .bind(role_id)
            .fetch_one(&self.pool)
            .await
            .map_err(read_error("Failed to count role members"))?;
        Ok(total as u64)
    }
}

/// Replace the grants of `role_id` inside the caller's transaction.
async fn grant_permissions(
    conn: &mut PgConnection,
    role_id: i64,
    permission_ids: &[i64],
    acting: Option<i64>,
) -> AppResult<()> {
    sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
        .bind(role_id)
        .execute(&mut *conn)
        .await
        .map_err(write_error("Failed to clear role permissions"))?;

    if !permission_ids.is_empty() {
        sqlx::query(
            "INSERT INTO role_permissions (role_id, permission_id, created_by) \
             SELECT $1, UNNEST($2::BIGINT[]), $3 ON CONFLICT DO NOTHING",
        )
        .bind(role_id)
        .bind(permission_ids.to_vec())
        .bind(acting)
        .execute(&mut *conn)
        .await
        .map_err(write_error("Failed to grant role permissions"))?;
    }
    Ok(())
}
