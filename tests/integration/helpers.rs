//! Shared test helpers for integration tests.

use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use http::{HeaderMap, Request, StatusCode};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use gatehouse_api::{AppState, build_app};
use gatehouse_core::config::AppConfig;
use gatehouse_database::{MemoryStore, OperationLogStore, PermissionStore, RoleStore, Stores, UserStore};
use gatehouse_entity::Status;
use gatehouse_entity::user::{NewUser, User};
use gatehouse_auth::PasswordHasher;

/// Password used for every seeded account.
pub const PASSWORD: &str = "secret1";

/// Test application context
pub struct TestApp {
    /// The full application router
    pub router: Router,
    /// Backing store, for direct inspection
    pub store: MemoryStore,
    /// Shared state the router was built from
    pub state: AppState,
    shutdown: CancellationToken,
}

/// Status, headers and parsed JSON body of one response
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }

    pub fn success(&self) -> bool {
        self.body["success"].as_bool().unwrap_or(false)
    }
}

/// Configuration with a cheap hasher, no rate limits and fast log flushes.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::from_toml("").expect("default config");
    config.auth.jwt_secret = "test-secret".into();
    config.auth.password_memory_kib = 64;
    config.auth.password_iterations = 1;
    config.rate_limit.enabled = false;
    config.operation_log.batch_size = 1;
    config.operation_log.flush_interval_ms = 10;
    config
}

impl TestApp {
    /// Create a new test application with the default test configuration
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: AppConfig) -> Self {
        let store = MemoryStore::with_builtin_rbac()
            .await
            .expect("seed built-in roles");
        let stores = Stores::memory(store.clone());
        let shutdown = CancellationToken::new();
        let (log_sink, _handle) = gatehouse_service::OperationLogSink::spawn(
            stores.logs.clone(),
            &config.operation_log,
            shutdown.clone(),
        );
        let state = AppState::new(config, stores, log_sink).expect("build state");
        let router = build_app(state.clone());

        Self {
            router,
            store,
            state,
            shutdown,
        }
    }

    /// Send a request with an optional JSON body and bearer token
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        self.send(request).await
    }

    /// Send a prepared request through the router
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Insert an enabled user holding the roles with the given codes
    pub async fn create_user(&self, username: &str, role_codes: &[&str]) -> User {
        let hasher = PasswordHasher::new(&self.state.config.auth).expect("hasher");
        let mut role_ids = Vec::new();
        for code in role_codes {
            role_ids.push(self.role_id(code).await);
        }
        self.store
            .create_with_roles(
                &NewUser {
                    username: username.into(),
                    password_hash: hasher.hash_password(PASSWORD).expect("hash"),
                    email: None,
                    phone: None,
                    real_name: None,
                    status: Status::Enabled,
                    created_by: None,
                },
                &role_ids,
            )
            .await
            .expect("insert user")
    }

    /// Log in and return the bearer token
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .request(
                "POST",
                "/api/auth/login",
                Some(serde_json::json!({ "username": username, "password": password })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {}", response.body);
        response.body["data"]["token"]
            .as_str()
            .expect("token in login response")
            .to_string()
    }

    /// Create `admin` with the ADMIN role and return its token
    pub async fn admin_token(&self) -> (User, String) {
        let admin = self.create_user("admin", &["ADMIN"]).await;
        let token = self.login("admin", PASSWORD).await;
        (admin, token)
    }

    pub async fn role_id(&self, code: &str) -> i64 {
        RoleStore::find_by_code(&self.store, code)
            .await
            .expect("role lookup")
            .expect("role exists")
            .id
    }

    pub async fn permission_id(&self, code: &str) -> i64 {
        PermissionStore::find_by_code(&self.store, code)
            .await
            .expect("permission lookup")
            .expect("permission exists")
            .id
    }

    /// Wait until the log sink has stored at least `expected` entries
    pub async fn wait_for_logs(&self, expected: u64) -> u64 {
        let mut count = 0;
        for _ in 0..200 {
            count = OperationLogStore::count(&self.store).await.expect("count");
            if count >= expected {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        count
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
