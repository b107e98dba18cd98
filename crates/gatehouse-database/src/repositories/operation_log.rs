//! Operation log repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use gatehouse_core::result::AppResult;
use gatehouse_core::types::pagination::{PageRequest, PageResponse};
use gatehouse_entity::operation_log::{NewOperationLog, OperationLog, OperationLogFilter};

use super::{LIKE_ESCAPE, like_pattern, read_error, write_error};
use crate::store::OperationLogStore;

const INSERT_COLUMNS: &str = "INSERT INTO operation_logs (user_id, username, operation, method, url, ip, \
     params, result, status, error_msg, execute_time, created_at) ";

/// Repository for the append-only operation log.
#[derive(Debug, Clone)]
pub struct OperationLogRepository {
    pool: PgPool,
}

impl OperationLogRepository {
    /// Create a new operation log repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &OperationLogFilter) {
    qb.push(" WHERE TRUE");
    if let Some(username) = &filter.username {
        qb.push(" AND username LIKE ")
            .push_bind(like_pattern(username))
            .push(LIKE_ESCAPE);
    }
    if let Some(operation) = &filter.operation {
        qb.push(" AND operation LIKE ")
            .push_bind(like_pattern(operation))
            .push(LIKE_ESCAPE);
    }
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status);
    }
}

#[async_trait]
impl OperationLogStore for OperationLogRepository {
    async fn insert(&self, entry: &NewOperationLog) -> AppResult<()> {
        self.insert_batch(std::slice::from_ref(entry)).await.map(|_| ())
    }

    async fn insert_batch(&self, entries: &[NewOperationLog]) -> AppResult<u64> {
        if entries.is_empty() {
            return Ok(0);
        }

        let mut qb = QueryBuilder::<Postgres>::new(INSERT_COLUMNS);
        qb.push_values(entries, |mut row, e| {
            row.push_bind(e.user_id)
                .push_bind(e.username.clone())
                .push_bind(e.operation.clone())
                .push_bind(e.method.clone())
                .push_bind(e.url.clone())
                .push_bind(e.ip.clone())
                .push_bind(e.params.clone())
                .push_bind(e.result.clone())
                .push_bind(e.status)
                .push_bind(e.error_msg.clone())
                .push_bind(e.execute_time)
                .push_bind(e.created_at);
        });

        let result = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(write_error("Failed to write operation logs"))?;
        Ok(result.rows_affected())
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<OperationLog>> {
        sqlx::query_as::<_, OperationLog>("SELECT * FROM operation_logs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(read_error("Failed to find operation log"))
    }

    async fn list(
        &self,
        filter: &OperationLogFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<OperationLog>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM operation_logs");
        push_filter(&mut count, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(read_error("Failed to count operation logs"))?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM operation_logs");
        push_filter(&mut select, filter);
        select
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(page.limit() as i64)
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);
        let logs = select
            .build_query_as::<OperationLog>()
            .fetch_all(&self.pool)
            .await
            .map_err(read_error("Failed to list operation logs"))?;

        Ok(PageResponse::new(logs, page, total as u64))
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM operation_logs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(write_error("Failed to delete operation log"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM operation_logs")
            .execute(&self.pool)
            .await
            .map_err(write_error("Failed to clear operation logs"))?;
        Ok(result.rows_affected())
    }

    async fn purge_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM operation_logs WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(write_error("Failed to purge operation logs"))?;
        Ok(result.rows_affected())
    }

    async fn count(&self) -> AppResult<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM operation_logs")
            .fetch_one(&self.pool)
            .await
            .map_err(read_error("Failed to count operation logs"))?;
        Ok(total as u64)
    }
}
