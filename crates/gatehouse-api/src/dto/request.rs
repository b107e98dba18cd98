//! Request DTOs with validation rules.

use serde::{Deserialize, Deserializer};
use validator::Validate;

use gatehouse_core::result::AppResult;
use gatehouse_entity::Status;
use gatehouse_entity::operation_log::{OperationLogFilter, OperationOutcome};
use gatehouse_entity::permission::PermissionType;
use gatehouse_entity::role::RoleFilter;
use gatehouse_entity::user::UserFilter;
use gatehouse_service::auth::{LoginInput, RegisterInput};
use gatehouse_service::permission::{CreatePermissionInput, UpdatePermissionInput};
use gatehouse_service::role::{CreateRoleInput, UpdateRoleInput};
use gatehouse_service::user::{CreateUserInput, UpdateUserInput};

/// Treat `""` as absent so an empty form field never hits a unique column.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

fn parse_optional<T>(raw: Option<String>) -> AppResult<Option<T>>
where
    T: std::str::FromStr<Err = gatehouse_core::AppError>,
{
    raw.filter(|s| !s.is_empty())
        .map(|s| s.parse::<T>())
        .transpose()
}

// ── Auth ─────────────────────────────────────────────────────

/// Self-registration request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
}

impl From<RegisterRequest> for RegisterInput {
    fn from(req: RegisterRequest) -> Self {
        Self {
            username: req.username,
            password: req.password,
            email: req.email,
        }
    }
}

/// Login request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl From<LoginRequest> for LoginInput {
    fn from(req: LoginRequest) -> Self {
        Self {
            username: req.username,
            password: req.password,
        }
    }
}

// ── Users ────────────────────────────────────────────────────

/// Admin user creation request.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(length(max = 20, message = "Phone must be at most 20 characters"))]
    pub phone: Option<String>,
    #[validate(length(max = 50, message = "Real name must be at most 50 characters"))]
    pub real_name: Option<String>,
    pub status: Option<Status>,
    #[serde(default)]
    pub role_ids: Vec<i64>,
}

impl From<CreateUserRequest> for CreateUserInput {
    fn from(req: CreateUserRequest) -> Self {
        Self {
            username: req.username,
            password: req.password,
            email: req.email,
            phone: req.phone,
            real_name: req.real_name,
            status: req.status,
            role_ids: req.role_ids,
        }
    }
}

/// Partial user update request.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(length(max = 20, message = "Phone must be at most 20 characters"))]
    pub phone: Option<String>,
    #[validate(length(max = 50, message = "Real name must be at most 50 characters"))]
    pub real_name: Option<String>,
    pub status: Option<Status>,
    pub role_ids: Option<Vec<i64>>,
}

impl From<UpdateUserRequest> for UpdateUserInput {
    fn from(req: UpdateUserRequest) -> Self {
        Self {
            email: req.email,
            phone: req.phone,
            real_name: req.real_name,
            status: req.status,
            role_ids: req.role_ids,
        }
    }
}

/// `PATCH /api/user/{id}/status` body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateStatusRequest {
    pub status: Status,
}

/// `POST /api/user/{id}/reset-password` body.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,
}

/// Filters for `GET /api/user/list`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserListQuery {
    pub username: Option<String>,
    pub email: Option<String>,
    pub status: Option<String>,
}

impl UserListQuery {
    pub fn into_filter(self) -> AppResult<UserFilter> {
        Ok(UserFilter {
            username: self.username.filter(|s| !s.is_empty()),
            email: self.email.filter(|s| !s.is_empty()),
            status: parse_optional::<Status>(self.status)?,
        })
    }
}

// ── Roles ────────────────────────────────────────────────────

/// Role creation request.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoleRequest {
    #[validate(length(min = 1, max = 50, message = "Role name must be 1-50 characters"))]
    pub role_name: String,
    #[validate(length(min = 1, max = 50, message = "Role code must be 1-50 characters"))]
    pub role_code: String,
    #[validate(length(max = 200, message = "Description must be at most 200 characters"))]
    pub description: Option<String>,
    pub status: Option<Status>,
    #[serde(default)]
    pub permission_ids: Vec<i64>,
}

impl From<CreateRoleRequest> for CreateRoleInput {
    fn from(req: CreateRoleRequest) -> Self {
        Self {
            role_name: req.role_name,
            role_code: req.role_code,
            description: req.description,
            status: req.status,
            permission_ids: req.permission_ids,
        }
    }
}

/// Partial role update request.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleRequest {
    #[validate(length(min = 1, max = 50, message = "Role name must be 1-50 characters"))]
    pub role_name: Option<String>,
    #[validate(length(max = 200, message = "Description must be at most 200 characters"))]
    pub description: Option<String>,
    pub status: Option<Status>,
    pub permission_ids: Option<Vec<i64>>,
}

impl From<UpdateRoleRequest> for UpdateRoleInput {
    fn from(req: UpdateRoleRequest) -> Self {
        Self {
            role_name: req.role_name,
            description: req.description,
            status: req.status,
            permission_ids: req.permission_ids,
        }
    }
}

/// Filters for `GET /api/role/list`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleListQuery {
    pub role_name: Option<String>,
    pub status: Option<String>,
}

impl RoleListQuery {
    pub fn into_filter(self) -> AppResult<RoleFilter> {
        Ok(RoleFilter {
            role_name: self.role_name.filter(|s| !s.is_empty()),
            status: parse_optional::<Status>(self.status)?,
        })
    }
}

// ── Permissions ──────────────────────────────────────────────

/// Permission creation request.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePermissionRequest {
    #[validate(length(min = 1, max = 50, message = "Permission name must be 1-50 characters"))]
    pub permission_name: String,
    #[validate(length(min = 1, max = 100, message = "Permission code must be 1-100 characters"))]
    pub permission_code: String,
    pub permission_type: Option<PermissionType>,
    #[validate(range(min = 0, message = "Parent id must not be negative"))]
    pub parent_id: Option<i64>,
    #[validate(length(max = 200))]
    pub path: Option<String>,
    #[validate(length(max = 200))]
    pub component: Option<String>,
    #[validate(length(max = 50))]
    pub icon: Option<String>,
    pub sort_order: Option<i32>,
    #[validate(length(max = 200, message = "Description must be at most 200 characters"))]
    pub description: Option<String>,
    pub status: Option<Status>,
}

impl From<CreatePermissionRequest> for CreatePermissionInput {
    fn from(req: CreatePermissionRequest) -> Self {
        Self {
            permission_name: req.permission_name,
            permission_code: req.permission_code,
            permission_type: req.permission_type,
            parent_id: req.parent_id,
            path: req.path,
            component: req.component,
            icon: req.icon,
            sort_order: req.sort_order,
            description: req.description,
            status: req.status,
        }
    }
}

/// Partial permission update request.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePermissionRequest {
    #[validate(length(min = 1, max = 50, message = "Permission name must be 1-50 characters"))]
    pub permission_name: Option<String>,
    pub permission_type: Option<PermissionType>,
    #[validate(range(min = 0, message = "Parent id must not be negative"))]
    pub parent_id: Option<i64>,
    #[validate(length(max = 200))]
    pub path: Option<String>,
    #[validate(length(max = 200))]
    pub component: Option<String>,
    #[validate(length(max = 50))]
    pub icon: Option<String>,
    pub sort_order: Option<i32>,
    #[validate(length(max = 200, message = "Description must be at most 200 characters"))]
    pub description: Option<String>,
    pub status: Option<Status>,
}

impl From<UpdatePermissionRequest> for UpdatePermissionInput {
    fn from(req: UpdatePermissionRequest) -> Self {
        Self {
            permission_name: req.permission_name,
            permission_type: req.permission_type,
            parent_id: req.parent_id,
            path: req.path,
            component: req.component,
            icon: req.icon,
            sort_order: req.sort_order,
            description: req.description,
            status: req.status,
        }
    }
}

// ── Operation logs ───────────────────────────────────────────

/// Filters for `GET /api/log/list`. `status` is `success` or `failure`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogListQuery {
    pub username: Option<String>,
    pub operation: Option<String>,
    pub status: Option<String>,
}

impl LogListQuery {
    pub fn into_filter(self) -> AppResult<OperationLogFilter> {
        Ok(OperationLogFilter {
            username: self.username.filter(|s| !s.is_empty()),
            operation: self.operation.filter(|s| !s.is_empty()),
            status: parse_optional::<OperationOutcome>(self.status)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_email_is_absent() {
        let req: RegisterRequest =
            serde_json::from_str(r#"{"username":"alice","password":"secret1","email":""}"#)
                .unwrap();
        assert!(req.email.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_register_rejects_short_username_and_bad_email() {
        let req: RegisterRequest =
            serde_json::from_str(r#"{"username":"al","password":"x","email":"nope"}"#).unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("email"));
    }

    #[test]
    fn test_create_user_uses_camel_case_and_defaults_roles() {
        let req: CreateUserRequest = serde_json::from_str(
            r#"{"username":"bob","password":"secret1","realName":"Bob","status":"disabled"}"#,
        )
        .unwrap();
        assert_eq!(req.real_name.as_deref(), Some("Bob"));
        assert_eq!(req.status, Some(Status::Disabled));
        assert!(req.role_ids.is_empty());
    }

    #[test]
    fn test_reset_password_field_name() {
        let req: ResetPasswordRequest =
            serde_json::from_str(r#"{"newPassword":"another1"}"#).unwrap();
        assert_eq!(req.new_password, "another1");
    }

    #[test]
    fn test_list_query_status_parsing() {
        let filter = UserListQuery {
            status: Some("0".into()),
            ..UserListQuery::default()
        }
        .into_filter()
        .unwrap();
        assert_eq!(filter.status, Some(Status::Disabled));

        let filter = LogListQuery {
            status: Some(String::new()),
            ..LogListQuery::default()
        }
        .into_filter()
        .unwrap();
        assert!(filter.status.is_none());

        assert!(
            RoleListQuery {
                status: Some("maybe".into()),
                ..RoleListQuery::default()
            }
            .into_filter()
            .is_err()
        );
    }

    #[test]
    fn test_permission_parent_must_not_be_negative() {
        let req: CreatePermissionRequest = serde_json::from_str(
            r#"{"permissionName":"List","permissionCode":"user:list","parentId":-1}"#,
        )
        .unwrap();
        assert!(req.validate().is_err());
    }
}
