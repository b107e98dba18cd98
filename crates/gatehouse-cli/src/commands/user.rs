//! User listing commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use gatehouse_core::config::AppConfig;
use gatehouse_core::error::AppError;
use gatehouse_core::types::pagination::PageRequest;
use gatehouse_database::UserStore;
use gatehouse_entity::Status;
use gatehouse_entity::user::UserFilter;

use crate::output::{self, OutputFormat};

/// Arguments for user commands
#[derive(Debug, Args)]
pub struct UserArgs {
    /// User subcommand
    #[command(subcommand)]
    pub command: UserCommand,
}

/// User subcommands
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// List users, newest first
    List {
        /// Substring match on username
        #[arg(short, long)]
        username: Option<String>,
        /// Status filter (enabled or disabled)
        #[arg(short, long)]
        status: Option<String>,
        /// Page number
        #[arg(long, default_value = "1")]
        page: u64,
        /// Page size
        #[arg(long, default_value = "20")]
        page_size: u64,
    },
}

/// User display row
#[derive(Debug, Serialize, Tabled)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    status: String,
    roles: String,
    last_login: String,
}

/// Execute user commands
pub async fn execute(
    args: &UserArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let db = super::connect(config).await?;
    let stores = db.stores();

    match &args.command {
        UserCommand::List {
            username,
            status,
            page,
            page_size,
        } => {
            let filter = UserFilter {
                username: username.clone(),
                email: None,
                status: status.as_deref().map(str::parse::<Status>).transpose()?,
            };
            let page = PageRequest::new(*page, *page_size);
            let users = stores.users.list(&filter, &page).await?;

            let mut rows = Vec::with_capacity(users.list.len());
            for user in &users.list {
                let roles = stores.users.roles_of(user.id).await?;
                rows.push(UserRow {
                    id: user.id,
                    username: user.username.clone(),
                    email: user.email.clone().unwrap_or_default(),
                    status: user.status.to_string(),
                    roles: roles
                        .iter()
                        .map(|r| r.role_code.as_str())
                        .collect::<Vec<_>>()
                        .join(","),
                    last_login: user
                        .last_login_time
                        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_else(|| "-".to_string()),
                });
            }

            output::print_list(&rows, format);
            output::print_page_footer(page.page, page.page_size, users.total, format);
        }
    }

    db.close().await;
    Ok(())
}
