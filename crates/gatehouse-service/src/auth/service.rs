//! Self-registration, credential login and the current-user payload.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use gatehouse_auth::{AuthorizationEngine, JwtEncoder, PasswordHasher, PasswordPolicy, TokenSubject};
use gatehouse_core::config::AuthConfig;
use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_database::{RoleStore, Stores, UserStore};
use gatehouse_entity::Status;
use gatehouse_entity::role::Role;
use gatehouse_entity::user::{NewUser, User};

use crate::context::RequestContext;

const BAD_CREDENTIALS: &str = "Invalid username or password";

/// Input for `POST /api/auth/register`.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInput {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
}

/// Public view of a freshly registered account.
#[derive(Debug, Clone, Serialize)]
pub struct RegisteredUser {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
}

/// Input for `POST /api/auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// Compact role reference used in session payloads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoleSummary {
    pub id: i64,
    pub role_name: String,
    pub role_code: String,
}

impl From<&Role> for RoleSummary {
    fn from(role: &Role) -> Self {
        Self {
            id: role.id,
            role_name: role.role_name.clone(),
            role_code: role.role_code.clone(),
        }
    }
}

/// The user part of a login response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub real_name: Option<String>,
    pub roles: Vec<RoleSummary>,
    pub permissions: Vec<String>,
}

/// Successful login: a signed token and the session user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResult {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: SessionUser,
}

/// `GET /api/auth/current` payload.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub user: User,
    pub roles: Vec<RoleSummary>,
    pub permissions: Vec<String>,
}

/// Handles account registration and credential login.
#[derive(Debug, Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    roles: Arc<dyn RoleStore>,
    engine: AuthorizationEngine,
    hasher: Arc<PasswordHasher>,
    encoder: Arc<JwtEncoder>,
    policy: PasswordPolicy,
    default_role_code: String,
}

impl AuthService {
    /// Creates a new auth service.
    pub fn new(
        stores: &Stores,
        engine: AuthorizationEngine,
        hasher: Arc<PasswordHasher>,
        encoder: Arc<JwtEncoder>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            users: stores.users.clone(),
            roles: stores.roles.clone(),
            engine,
            hasher,
            encoder,
            policy: PasswordPolicy::new(config),
            default_role_code: config.default_role_code.clone(),
        }
    }

    /// Registers an enabled account and grants the default role when it
    /// exists and is enabled.
    pub async fn register(&self, input: RegisterInput) -> AppResult<RegisteredUser> {
        self.policy.validate(&input.password)?;

        if self.users.find_by_username(&input.username).await?.is_some() {
            return Err(AppError::conflict("Username already exists"));
        }
        if let Some(email) = &input.email {
            if self.users.find_by_email(email).await?.is_some() {
                return Err(AppError::conflict("Email already exists"));
            }
        }

        let default_roles = match self.roles.find_by_code(&self.default_role_code).await? {
            Some(role) if role.status.is_enabled() => vec![role.id],
            _ => {
                warn!(
                    role_code = %self.default_role_code,
                    "Default role missing or disabled; registered user has no roles"
                );
                Vec::new()
            }
        };

        let password_hash = self.hasher.hash_password(&input.password)?;
        let new_user = NewUser {
            username: input.username,
            password_hash,
            email: input.email,
            phone: None,
            real_name: None,
            status: Status::Enabled,
            created_by: None,
        };
        let user = self
            .users
            .create_with_roles(&new_user, &default_roles)
            .await?;

        info!(user_id = user.id, username = %user.username, "User registered");

        Ok(RegisteredUser {
            id: user.id,
            username: user.username,
            email: user.email,
        })
    }

    /// Verifies credentials and issues a session token.
    ///
    /// A disabled account is refused before its password is checked.
    pub async fn login(&self, input: LoginInput, ip: &str) -> AppResult<LoginResult> {
        let user = self
            .users
            .find_by_username(&input.username)
            .await?
            .ok_or_else(|| AppError::authentication(BAD_CREDENTIALS))?;

        if !user.can_login() {
            return Err(AppError::authorization("Account is disabled"));
        }

        if !self
            .hasher
            .verify_password(&input.password, &user.password_hash)?
        {
            return Err(AppError::authentication(BAD_CREDENTIALS));
        }

        self.users.record_login(user.id, ip).await?;

        let roles = self.enabled_roles(user.id).await?;
        let permissions = self.engine.effective_permissions(user.id).await?;
        let issued = self.encoder.issue(&TokenSubject {
            user_id: user.id,
            username: user.username.clone(),
            roles: roles.iter().map(|r| r.role_code.clone()).collect(),
            permissions: permissions.clone(),
        })?;

        info!(user_id = user.id, ip, "User logged in");

        Ok(LoginResult {
            token: issued.token,
            expires_at: issued.expires_at,
            user: SessionUser {
                id: user.id,
                username: user.username,
                email: user.email,
                real_name: user.real_name,
                roles,
                permissions,
            },
        })
    }

    /// Refuses a token whose account was deleted or disabled after issue.
    pub async fn ensure_active(&self, user_id: i64) -> AppResult<()> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::authentication("Account no longer exists"))?;
        if !user.can_login() {
            return Err(AppError::authorization("Account is disabled"));
        }
        Ok(())
    }

    /// Profile, enabled roles and effective permissions of the caller.
    pub async fn current_user(&self, ctx: &RequestContext) -> AppResult<CurrentUser> {
        let user = self
            .users
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        let roles = self.enabled_roles(user.id).await?;
        let permissions = self.engine.effective_permissions(user.id).await?;
        Ok(CurrentUser {
            user,
            roles,
            permissions,
        })
    }

    /// Tokens are stateless; logging out only records the event.
    pub async fn logout(&self, ctx: &RequestContext) -> AppResult<()> {
        info!(user_id = ctx.user_id, "User logged out");
        Ok(())
    }

    async fn enabled_roles(&self, user_id: i64) -> AppResult<Vec<RoleSummary>> {
        Ok(self
            .users
            .roles_of(user_id)
            .await?
            .iter()
            .filter(|r| r.status.is_enabled())
            .map(RoleSummary::from)
            .collect())
    }
}
