//! Operation log queries and housekeeping.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::info;

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_core::types::pagination::{PageRequest, PageResponse};
use gatehouse_database::{OperationLogStore, Stores};
use gatehouse_entity::operation_log::{OperationLog, OperationLogFilter};

/// Read and prune the operation log.
#[derive(Debug, Clone)]
pub struct OperationLogService {
    logs: Arc<dyn OperationLogStore>,
}

impl OperationLogService {
    pub fn new(stores: &Stores) -> Self {
        Self {
            logs: stores.logs.clone(),
        }
    }

    pub async fn list(
        &self,
        filter: &OperationLogFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<OperationLog>> {
        self.logs.list(filter, page).await
    }

    pub async fn get(&self, id: i64) -> AppResult<OperationLog> {
        self.logs
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Operation log not found"))
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        if !self.logs.delete(id).await? {
            return Err(AppError::not_found("Operation log not found"));
        }
        Ok(())
    }

    /// Remove every entry. Returns the number removed.
    pub async fn clear(&self) -> AppResult<u64> {
        let removed = self.logs.clear().await?;
        info!(removed, "Operation log cleared");
        Ok(removed)
    }

    /// Remove entries older than `days` days. Returns the number removed.
    pub async fn purge_older_than(&self, days: u32) -> AppResult<u64> {
        let cutoff = Utc::now() - Duration::days(i64::from(days));
        let removed = self.logs.purge_before(cutoff).await?;
        info!(removed, days, %cutoff, "Old operation logs purged");
        Ok(removed)
    }
}
