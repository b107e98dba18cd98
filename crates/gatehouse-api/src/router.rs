//! Route definitions.
//!
//! Every path is registered in full so the matched pattern equals the key
//! used by [`crate::access::ROUTE_ACCESS`].

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, patch, post};

use crate::handlers;
use crate::middleware::authorize::authorize;
use crate::middleware::operation_log::record_operation;
use crate::state::AppState;

/// Builds the API router with authorization and operation logging.
///
/// Authorization wraps matched routes only; the operation log also sees
/// requests that fall through to the 404 handler.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(auth_routes())
        .merge(user_routes())
        .merge(role_routes())
        .merge(permission_routes())
        .merge(dashboard_routes())
        .merge(log_routes())
        .route_layer(from_fn_with_state(state.clone(), authorize))
        .fallback(handlers::not_found)
        .layer(from_fn_with_state(state.clone(), record_operation))
        .with_state(state)
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/api/health", get(handlers::health::health))
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/current", get(handlers::auth::current))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/user/list", get(handlers::user::list))
        .route("/api/user", post(handlers::user::create))
        .route(
            "/api/user/{id}",
            get(handlers::user::get)
                .put(handlers::user::update)
                .delete(handlers::user::delete),
        )
        .route("/api/user/{id}/status", patch(handlers::user::change_status))
        .route(
            "/api/user/{id}/reset-password",
            post(handlers::user::reset_password),
        )
}

fn role_routes() -> Router<AppState> {
    Router::new()
        .route("/api/role/list", get(handlers::role::list))
        .route("/api/role/all", get(handlers::role::all))
        .route("/api/role", post(handlers::role::create))
        .route(
            "/api/role/{id}",
            get(handlers::role::get)
                .put(handlers::role::update)
                .delete(handlers::role::delete),
        )
}

fn permission_routes() -> Router<AppState> {
    Router::new()
        .route("/api/permission/tree", get(handlers::permission::tree))
        .route("/api/permission/all", get(handlers::permission::all))
        .route("/api/permission", post(handlers::permission::create))
        .route(
            "/api/permission/{id}",
            get(handlers::permission::get)
                .put(handlers::permission::update)
                .delete(handlers::permission::delete),
        )
}

fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/api/dashboard/stats", get(handlers::dashboard::stats))
}

fn log_routes() -> Router<AppState> {
    Router::new()
        .route("/api/log/list", get(handlers::log::list))
        .route("/api/log/clear", delete(handlers::log::clear))
        .route(
            "/api/log/{id}",
            get(handlers::log::get).delete(handlers::log::delete),
        )
}
