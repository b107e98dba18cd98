//! Authorization engine: decides whether a user holds a permission code.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_database::PermissionStore;

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => write!(f, "allow"),
            Self::Deny => write!(f, "deny"),
        }
    }
}

/// Evaluates the user → role → permission graph on every call.
///
/// A user is allowed a code only when the user, one of its roles and the
/// permission are all enabled. Nothing is cached, so revocations apply to
/// the next request. A store failure is returned as an error and never
/// turned into a denial.
#[derive(Debug, Clone)]
pub struct AuthorizationEngine {
    permissions: Arc<dyn PermissionStore>,
}

impl AuthorizationEngine {
    pub fn new(permissions: Arc<dyn PermissionStore>) -> Self {
        Self { permissions }
    }

    /// Decide whether `user_id` holds `code`.
    pub async fn authorize(&self, user_id: i64, code: &str) -> AppResult<Decision> {
        let granted = self.permissions.has_grant(user_id, code).await?;
        let decision = if granted {
            Decision::Allow
        } else {
            Decision::Deny
        };
        debug!(user_id, code, %decision, "Authorization evaluated");
        Ok(decision)
    }

    /// Like [`authorize`](Self::authorize) but turns a denial into an
    /// authorization error.
    pub async fn require(&self, user_id: i64, code: &str) -> AppResult<()> {
        match self.authorize(user_id, code).await? {
            Decision::Allow => Ok(()),
            Decision::Deny => Err(AppError::authorization(format!(
                "Missing permission '{code}'"
            ))),
        }
    }

    /// Sorted, de-duplicated codes the user currently holds.
    pub async fn effective_permissions(&self, user_id: i64) -> AppResult<Vec<String>> {
        self.permissions.effective_codes(user_id).await
    }
}
