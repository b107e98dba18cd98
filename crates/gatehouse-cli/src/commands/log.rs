//! Operation log housekeeping commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use gatehouse_core::config::AppConfig;
use gatehouse_core::error::AppError;
use gatehouse_core::types::pagination::PageRequest;
use gatehouse_entity::operation_log::{OperationLogFilter, OperationOutcome};
use gatehouse_service::OperationLogService;

use crate::output::{self, OutputFormat};

/// Arguments for log commands
#[derive(Debug, Args)]
pub struct LogArgs {
    /// Log subcommand
    #[command(subcommand)]
    pub command: LogCommand,
}

/// Log subcommands
#[derive(Debug, Subcommand)]
pub enum LogCommand {
    /// Show recent operation log entries
    List {
        /// Substring match on username
        #[arg(short, long)]
        username: Option<String>,
        /// Outcome filter (success or failure)
        #[arg(short, long)]
        status: Option<String>,
        /// Number of entries
        #[arg(short, long, default_value = "50")]
        limit: u64,
    },
    /// Delete entries older than the retention period
    Purge {
        /// Days to keep; defaults to `operation_log.retention_days`
        #[arg(short, long)]
        days: Option<u32>,
    },
    /// Delete every entry
    Clear {
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

/// Log display row
#[derive(Debug, Serialize, Tabled)]
struct LogRow {
    time: String,
    user: String,
    method: String,
    url: String,
    status: String,
    ms: i64,
    ip: String,
}

/// Execute log commands
pub async fn execute(
    args: &LogArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let db = super::connect(config).await?;
    let service = OperationLogService::new(&db.stores());

    match &args.command {
        LogCommand::List {
            username,
            status,
            limit,
        } => {
            let filter = OperationLogFilter {
                username: username.clone(),
                operation: None,
                status: status
                    .as_deref()
                    .map(str::parse::<OperationOutcome>)
                    .transpose()?,
            };
            let page = service.list(&filter, &PageRequest::new(1, *limit)).await?;
            let rows: Vec<LogRow> = page
                .list
                .into_iter()
                .map(|log| LogRow {
                    time: log.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                    user: log.username.unwrap_or_else(|| "-".to_string()),
                    method: log.method,
                    url: log.url,
                    status: log.status.to_string(),
                    ms: log.execute_time,
                    ip: log.ip.unwrap_or_default(),
                })
                .collect();
            output::print_list(&rows, format);
        }
        LogCommand::Purge { days } => {
            let days = days.unwrap_or(config.operation_log.retention_days);
            let removed = service.purge_older_than(days).await?;
            output::print_success(&format!(
                "Removed {} entries older than {} days",
                removed, days
            ));
        }
        LogCommand::Clear { force } => {
            if !force && !super::confirm("This will delete every operation log entry. Continue?")? {
                output::print_warning("Cancelled.");
            } else {
                let removed = service.clear().await?;
                output::print_success(&format!("Removed {} entries", removed));
            }
        }
    }

    db.close().await;
    Ok(())
}
