//! Declarative route → access requirement table.
//!
//! The authorization middleware looks up the matched route pattern here
//! instead of each handler checking permissions itself. A route that is
//! not listed requires authentication but no particular permission.

/// Permission code for user administration.
pub const USER_MANAGE: &str = "user:manage";
/// Permission code for role administration.
pub const ROLE_MANAGE: &str = "role:manage";
/// Permission code for permission administration.
pub const PERMISSION_MANAGE: &str = "permission:manage";
/// Permission code for the dashboard.
pub const DASHBOARD_VIEW: &str = "dashboard:view";
/// Permission code for operation log administration.
pub const LOG_MANAGE: &str = "log:manage";

/// What a caller needs to reach a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// No token required.
    Public,
    /// Any valid token.
    Authenticated,
    /// A valid token whose user currently holds the permission code.
    Permission(&'static str),
}

/// One row of the access table.
#[derive(Debug, Clone, Copy)]
pub struct RouteAccess {
    pub method: &'static str,
    /// Route pattern exactly as registered on the router.
    pub path: &'static str,
    pub access: Access,
}

const fn route(method: &'static str, path: &'static str, access: Access) -> RouteAccess {
    RouteAccess {
        method,
        path,
        access,
    }
}

/// Access requirement of every registered route.
pub static ROUTE_ACCESS: &[RouteAccess] = &[
    route("GET", "/api/health", Access::Public),
    // auth
    route("POST", "/api/auth/register", Access::Public),
    route("POST", "/api/auth/login", Access::Public),
    route("POST", "/api/auth/logout", Access::Authenticated),
    route("GET", "/api/auth/current", Access::Authenticated),
    // users
    route("GET", "/api/user/list", Access::Permission(USER_MANAGE)),
    route("GET", "/api/user/{id}", Access::Permission(USER_MANAGE)),
    route("POST", "/api/user", Access::Permission(USER_MANAGE)),
    route("PUT", "/api/user/{id}", Access::Permission(USER_MANAGE)),
    route("DELETE", "/api/user/{id}", Access::Permission(USER_MANAGE)),
    route("PATCH", "/api/user/{id}/status", Access::Permission(USER_MANAGE)),
    route("POST", "/api/user/{id}/reset-password", Access::Permission(USER_MANAGE)),
    // roles
    route("GET", "/api/role/list", Access::Permission(ROLE_MANAGE)),
    route("GET", "/api/role/all", Access::Permission(ROLE_MANAGE)),
    route("GET", "/api/role/{id}", Access::Permission(ROLE_MANAGE)),
    route("POST", "/api/role", Access::Permission(ROLE_MANAGE)),
    route("PUT", "/api/role/{id}", Access::Permission(ROLE_MANAGE)),
    route("DELETE", "/api/role/{id}", Access::Permission(ROLE_MANAGE)),
    // permissions
    route("GET", "/api/permission/tree", Access::Permission(PERMISSION_MANAGE)),
    route("GET", "/api/permission/all", Access::Permission(PERMISSION_MANAGE)),
    route("GET", "/api/permission/{id}", Access::Permission(PERMISSION_MANAGE)),
    route("POST", "/api/permission", Access::Permission(PERMISSION_MANAGE)),
    route("PUT", "/api/permission/{id}", Access::Permission(PERMISSION_MANAGE)),
    route("DELETE", "/api/permission/{id}", Access::Permission(PERMISSION_MANAGE)),
    // dashboard
    route("GET", "/api/dashboard/stats", Access::Permission(DASHBOARD_VIEW)),
    // operation logs
    route("GET", "/api/log/list", Access::Permission(LOG_MANAGE)),
    route("GET", "/api/log/{id}", Access::Permission(LOG_MANAGE)),
    route("DELETE", "/api/log/clear", Access::Permission(LOG_MANAGE)),
    route("DELETE", "/api/log/{id}", Access::Permission(LOG_MANAGE)),
];

/// Access requirement for a method and matched route pattern.
pub fn lookup(method: &str, path: &str) -> Access {
    ROUTE_ACCESS
        .iter()
        .find(|r| r.method.eq_ignore_ascii_case(method) && r.path == path)
        .map(|r| r.access)
        .unwrap_or(Access::Authenticated)
}
