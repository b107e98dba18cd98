//! Dashboard counters.

use serde::Serialize;

use gatehouse_core::result::AppResult;
use gatehouse_database::Stores;

/// Row counts shown on the dashboard.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub user_count: u64,
    pub role_count: u64,
    pub permission_count: u64,
    pub log_count: u64,
}

#[derive(Debug, Clone)]
pub struct DashboardService {
    stores: Stores,
}

impl DashboardService {
    pub fn new(stores: &Stores) -> Self {
        Self {
            stores: stores.clone(),
        }
    }

    pub async fn stats(&self) -> AppResult<DashboardStats> {
        let (user_count, role_count, permission_count, log_count) = tokio::try_join!(
            self.stores.users.count(),
            self.stores.roles.count(),
            self.stores.permissions.count(),
            self.stores.logs.count(),
        )?;
        Ok(DashboardStats {
            user_count,
            role_count,
            permission_count,
            log_count,
        })
    }
}
