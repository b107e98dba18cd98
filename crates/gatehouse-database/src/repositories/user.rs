//! User repository implementation.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_core::types::pagination::{PageRequest, PageResponse};
use gatehouse_entity::role::Role;
use gatehouse_entity::user::{NewUser, User, UserChanges, UserFilter};

use super::{LIKE_ESCAPE, like_pattern, read_error, write_error};
use crate::store::UserStore;

/// Repository for user CRUD, login bookkeeping and role membership.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &UserFilter) {
    qb.push(" WHERE TRUE");
    if let Some(username) = &filter.username {
        qb.push(" AND username LIKE ")
            .push_bind(like_pattern(username))
            .push(LIKE_ESCAPE);
    }
    if let Some(email) = &filter.email {
        qb.push(" AND email LIKE ")
            .push_bind(like_pattern(email))
            .push(LIKE_ESCAPE);
    }
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status);
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(read_error("Failed to find user by id"))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(read_error("Failed to find user by username"))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(read_error("Failed to find user by email"))
    }

    async fn list(&self, filter: &UserFilter, page: &PageRequest) -> AppResult<PageResponse<User>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users");
        push_filter(&mut count, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(read_error("Failed to count users"))?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM users");
        push_filter(&mut select, filter);
        select
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(page.limit() as i64)
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);
        let users = select
            .build_query_as::<User>()
            .fetch_all(&self.pool)
            .await
            .map_err(read_error("Failed to list users"))?;

        Ok(PageResponse::new(users, page, total as u64))
    }

    async fn create_with_roles(&self, data: &NewUser, role_ids: &[i64]) -> AppResult<User> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(read_error("Failed to begin transaction"))?;

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password_hash, email, phone, real_name, status, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(&data.username)
        .bind(&data.password_hash)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(&data.real_name)
        .bind(data.status)
        .bind(data.created_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(write_error("Failed to create user"))?;

        if !role_ids.is_empty() {
            assign_roles(&mut tx, user.id, role_ids, data.created_by).await?;
        }

        tx.commit()
            .await
            .map_err(write_error("Failed to commit new user"))?;
        Ok(user)
    }

    async fn update_with_roles(
        &self,
        id: i64,
        changes: &UserChanges,
        role_ids: Option<&[i64]>,
    ) -> AppResult<User> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(read_error("Failed to begin transaction"))?;

        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET email = COALESCE($2, email), phone = COALESCE($3, phone), \
             real_name = COALESCE($4, real_name), status = COALESCE($5, status), \
             updated_by = COALESCE($6, updated_by), updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&changes.email)
        .bind(&changes.phone)
        .bind(&changes.real_name)
        .bind(changes.status)
        .bind(changes.updated_by)
        .fetch_optional(&mut *tx)
        .await
        .map_err(write_error("Failed to update user"))?
        .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;

        if let Some(role_ids) = role_ids {
            assign_roles(&mut tx, id, role_ids, changes.updated_by).await?;
        }

        tx.commit()
            .await
            .map_err(write_error("Failed to commit user update"))?;
        Ok(user)
    }

    async fn update_password(
        &self,
        id: i64,
        password_hash: &str,
        updated_by: i64,
    ) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_by = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .bind(updated_by)
        .execute(&self.pool)
        .await
        .map_err(write_error("Failed to update password"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User {id} not found")));
        }
        Ok(())
    }

    async fn record_login(&self, id: i64, ip: &str) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_login_time = NOW(), last_login_ip = $2 WHERE id = $1")
            .bind(id)
            .bind(ip)
            .execute(&self.pool)
            .await
            .map_err(write_error("Failed to record login"))?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(write_error("Failed to delete user"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> AppResult<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(read_error("Failed to count users"))?;
        Ok(total as u64)
    }

    async fn roles_of(&self, user_id: i64) -> AppResult<Vec<Role>> {
        sqlx::query_as::<_, Role>(
            "SELECT r.* FROM roles r \
             INNER JOIN user_roles ur ON ur.role_id = r.id \
             WHERE ur.user_id = $1 ORDER BY r.id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(read_error("Failed to load user roles"))
    }

    async fn replace_roles(
        &self,
        user_id: i64,
        role_ids: &[i64],
        acting: Option<i64>,
    ) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(read_error("Failed to begin transaction"))?;
        assign_roles(&mut tx, user_id, role_ids, acting).await?;
        tx.commit()
            .await
            .map_err(write_error("Failed to commit user roles"))
    }
}

/// Replace the memberships of `user_id` inside the caller's transaction.
async fn assign_roles(
    conn: &mut PgConnection,
    user_id: i64,
    role_ids: &[i64],
    acting: Option<i64>,
) -> AppResult<()> {
    sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *conn)
        .await
        .map_err(write_error("Failed to clear user roles"))?;

    if !role_ids.is_empty() {
        sqlx::query(
            "INSERT INTO user_roles (user_id, role_id, created_by) \
             SELECT $1, UNNEST($2::BIGINT[]), $3 ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(role_ids.to_vec())
        .bind(acting)
        .execute(&mut *conn)
        .await
        .map_err(write_error("Failed to assign user roles"))?;
    }
    Ok(())
}
