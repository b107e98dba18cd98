//! Administrator account commands.
//!
//! These bypass the HTTP API so that the first administrator can be created
//! on an empty database.

use clap::{Args, Subcommand};

use gatehouse_auth::{PasswordHasher, PasswordPolicy};
use gatehouse_core::config::AppConfig;
use gatehouse_core::error::AppError;
use gatehouse_database::{RoleStore, UserStore};
use gatehouse_entity::Status;
use gatehouse_entity::user::NewUser;

use crate::output;

/// Code of the built-in role holding every permission.
const ADMIN_ROLE_CODE: &str = "ADMIN";

/// Arguments for admin commands
#[derive(Debug, Args)]
pub struct AdminArgs {
    /// Admin subcommand
    #[command(subcommand)]
    pub command: AdminCommand,
}

/// Admin subcommands
#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// Create a user holding the ADMIN role
    Create {
        /// Username
        #[arg(short, long)]
        username: Option<String>,
        /// Email
        #[arg(short, long)]
        email: Option<String>,
        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Reset any user's password
    ResetPassword {
        /// Username of the account
        #[arg(short, long)]
        username: String,
        /// New password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },
}

/// Execute admin commands
pub async fn execute(args: &AdminArgs, config: &AppConfig) -> Result<(), AppError> {
    let db = super::connect(config).await?;
    let stores = db.stores();
    let hasher = PasswordHasher::new(&config.auth)?;
    let policy = PasswordPolicy::new(&config.auth);

    match &args.command {
        AdminCommand::Create {
            username,
            email,
            password,
        } => {
            let username = super::prompt_text(username, "Admin username")?;
            let email = match email {
                Some(e) => Some(e.clone()),
                None => {
                    let e: String = dialoguer::Input::new()
                        .with_prompt("Admin email (optional, press Enter to skip)")
                        .allow_empty(true)
                        .interact_text()
                        .map_err(|e| AppError::internal(format!("Input error: {}", e)))?;
                    if e.trim().is_empty() { None } else { Some(e) }
                }
            };
            let password = super::prompt_password(password, "Admin password")?;
            policy.validate(&password)?;

            if stores.users.find_by_username(&username).await?.is_some() {
                return Err(AppError::conflict(format!(
                    "User '{}' already exists",
                    username
                )));
            }
            let admin_role = stores
                .roles
                .find_by_code(ADMIN_ROLE_CODE)
                .await?
                .ok_or_else(|| {
                    AppError::not_found("ADMIN role is missing; run `gatehouse-cli migrate run`")
                })?;

            let new_user = NewUser {
                username: username.clone(),
                password_hash: hasher.hash_password(&password)?,
                email,
                phone: None,
                real_name: Some(username.clone()),
                status: Status::Enabled,
                created_by: None,
            };
            let user = stores
                .users
                .create_with_roles(&new_user, &[admin_role.id])
                .await?;

            output::print_success(&format!(
                "Admin user '{}' created (id: {})",
                username, user.id
            ));
        }
        AdminCommand::ResetPassword { username, password } => {
            let user = stores
                .users
                .find_by_username(username)
                .await?
                .ok_or_else(|| AppError::not_found(format!("User '{}' not found", username)))?;

            let password = super::prompt_password(password, "New password")?;
            policy.validate(&password)?;
            stores
                .users
                .update_password(user.id, &hasher.hash_password(&password)?, user.id)
                .await?;

            output::print_success(&format!("Password reset for '{}'", username));
        }
    }

    db.close().await;
    Ok(())
}
