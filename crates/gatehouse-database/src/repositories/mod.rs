//! PostgreSQL implementations of the store traits.

pub mod operation_log;
pub mod permission;
pub mod role;
pub mod user;

pub use operation_log::OperationLogRepository;
pub use permission::PermissionRepository;
pub use role::RoleRepository;
pub use user::UserRepository;

use gatehouse_core::error::{AppError, ErrorKind};

/// Wrap a read failure as a database error.
pub(crate) fn read_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, context, e)
}

/// Classify a write failure: unique violations become conflicts, dangling
/// references become validation errors, anything else is a database error.
pub(crate) fn write_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::conflict(conflict_message(db_err.constraint()))
        }
        sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
            AppError::validation("Referenced role or permission does not exist")
        }
        _ => AppError::with_source(ErrorKind::Database, context, e),
    }
}

fn conflict_message(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("users_username_key") => "Username already exists",
        Some("users_email_key") => "Email already exists",
        Some("roles_role_name_key") | Some("roles_role_code_key") => {
            "Role name or role code already exists"
        }
        Some("permissions_permission_code_key") => "Permission code already exists",
        _ => "Duplicate entry",
    }
}

/// Wrap a user-supplied fragment for a substring `LIKE` match.
///
/// `%`, `_` and `\` in the fragment match literally; queries pair this
/// with [`LIKE_ESCAPE`].
pub(crate) fn like_pattern(fragment: &str) -> String {
    let mut pattern = String::with_capacity(fragment.len() + 2);
    pattern.push('%');
    for c in fragment.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Clause following every bound [`like_pattern`].
pub(crate) const LIKE_ESCAPE: &str = " ESCAPE '\\'";
