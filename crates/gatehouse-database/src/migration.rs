//! Database migration runner.

use sqlx::PgPool;
use tracing::info;

use gatehouse_core::error::{AppError, ErrorKind};

/// Run all pending database migrations embedded from `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    info!("Running database migrations...");

    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to run migrations: {e}"),
                e,
            )
        })?;

    info!("Database migrations completed successfully");
    Ok(())
}

/// One row of migration status.
#[derive(Debug, Clone)]
pub struct MigrationStatus {
    /// Migration version number.
    pub version: i64,
    /// Migration description.
    pub description: String,
    /// Whether it has been applied to this database.
    pub applied: bool,
}

/// SQLSTATE for `undefined_table`.
const UNDEFINED_TABLE: &str = "42P01";

/// List embedded migrations and whether each is applied.
///
/// A database that has never been migrated has no `_sqlx_migrations` table;
/// that reads as "nothing applied". Any other failure is returned.
pub async fn migration_status(pool: &PgPool) -> Result<Vec<MigrationStatus>, AppError> {
    let applied = applied_versions(
        sqlx::query_scalar(
            "SELECT version FROM _sqlx_migrations WHERE success = TRUE ORDER BY version",
        )
        .fetch_all(pool)
        .await,
    )?;

    Ok(sqlx::migrate!("../../migrations")
        .iter()
        .map(|m| MigrationStatus {
            version: m.version,
            description: m.description.to_string(),
            applied: applied.contains(&m.version),
        })
        .collect())
}

fn applied_versions(result: Result<Vec<i64>, sqlx::Error>) -> Result<Vec<i64>, AppError> {
    match result {
        Ok(versions) => Ok(versions),
        Err(sqlx::Error::Database(ref db_err))
            if db_err.code().as_deref() == Some(UNDEFINED_TABLE) =>
        {
            Ok(Vec::new())
        }
        Err(e) => Err(AppError::with_source(
            ErrorKind::Database,
            "Failed to read migration history",
            e,
        )),
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;
    use std::error::Error as StdError;
    use std::fmt;

    use sqlx::error::{DatabaseError, ErrorKind as SqlxErrorKind};

    use super::*;

    #[derive(Debug)]
    struct PgFailure(&'static str);

    impl fmt::Display for PgFailure {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "sqlstate {}", self.0)
        }
    }

    impl StdError for PgFailure {}

    impl DatabaseError for PgFailure {
        fn message(&self) -> &str {
            "pg failure"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(self.0))
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> SqlxErrorKind {
            SqlxErrorKind::Other
        }
    }

    fn pg_error(code: &'static str) -> sqlx::Error {
        sqlx::Error::Database(Box::new(PgFailure(code)))
    }

    #[test]
    fn test_missing_history_table_reads_as_empty() {
        let versions = applied_versions(Err(pg_error(UNDEFINED_TABLE))).unwrap();
        assert!(versions.is_empty());
    }

    #[test]
    fn test_other_database_errors_propagate() {
        // insufficient_privilege
        let err = applied_versions(Err(pg_error("42501"))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Database);
        assert!(err.source.is_some());

        let err = applied_versions(Err(sqlx::Error::PoolTimedOut)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Database);
    }

    #[test]
    fn test_applied_versions_pass_through() {
        assert_eq!(applied_versions(Ok(vec![1, 2])).unwrap(), vec![1, 2]);
    }
}
