//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Duration;

use gatehouse_auth::{AuthorizationEngine, JwtDecoder, JwtEncoder, PasswordHasher};
use gatehouse_core::config::AppConfig;
use gatehouse_core::result::AppResult;
use gatehouse_database::Stores;
use gatehouse_service::{
    AuthService, DashboardService, OperationLogService, OperationLogSink, PermissionService,
    RoleService, UserService,
};

use crate::middleware::rate_limit::RateLimiter;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped or cheap clones.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Auth ─────────────────────────────────────────────────
    /// JWT token decoder and validator
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Permission check over the RBAC graph
    pub engine: AuthorizationEngine,

    // ── Services ─────────────────────────────────────────────
    /// Registration and login
    pub auth_service: Arc<AuthService>,
    /// User administration
    pub user_service: Arc<UserService>,
    /// Role administration
    pub role_service: Arc<RoleService>,
    /// Permission administration
    pub permission_service: Arc<PermissionService>,
    /// Operation log administration
    pub log_service: Arc<OperationLogService>,
    /// Dashboard counters
    pub dashboard_service: Arc<DashboardService>,

    // ── Pipeline ─────────────────────────────────────────────
    /// Asynchronous operation log writer
    pub log_sink: OperationLogSink,
    /// Per-client limiter for every route
    pub rate_limiter: Arc<RateLimiter>,
    /// Per-client limiter for login attempts
    pub login_limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Wire the credential primitives and services over `stores`.
    pub fn new(config: AppConfig, stores: Stores, log_sink: OperationLogSink) -> AppResult<Self> {
        let hasher = Arc::new(PasswordHasher::new(&config.auth)?);
        let jwt_encoder = Arc::new(JwtEncoder::new(&config.auth));
        let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));
        let engine = AuthorizationEngine::new(stores.permissions.clone());

        let auth_service = Arc::new(AuthService::new(
            &stores,
            engine.clone(),
            Arc::clone(&hasher),
            jwt_encoder,
            &config.auth,
        ));
        let user_service = Arc::new(UserService::new(&stores, hasher, &config.auth));
        let role_service = Arc::new(RoleService::new(&stores));
        let permission_service = Arc::new(PermissionService::new(&stores));
        let log_service = Arc::new(OperationLogService::new(&stores));
        let dashboard_service = Arc::new(DashboardService::new(&stores));

        let limits = &config.rate_limit;
        let rate_limiter = Arc::new(RateLimiter::new(
            Duration::from_millis(limits.window_ms),
            limits.max_requests,
        ));
        let login_limiter = Arc::new(RateLimiter::new(
            Duration::from_millis(limits.login_window_ms),
            limits.login_max_requests,
        ));

        Ok(Self {
            config: Arc::new(config),
            jwt_decoder,
            engine,
            auth_service,
            user_service,
            role_service,
            permission_service,
            log_service,
            dashboard_service,
            log_sink,
            rate_limiter,
            login_limiter,
        })
    }
}
