//! Per-client rate limiting in front of the router.

use axum::body::Body;
use http::{Request, StatusCode, header};
use serde_json::json;

use crate::helpers::{TestApp, test_config};

fn login_from(ip: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("Content-Type", "application/json")
        .header("X-Forwarded-For", ip)
        .body(Body::from(
            json!({ "username": "nobody", "password": "whatever" }).to_string(),
        ))
        .unwrap()
}

fn health_from(ip: &str) -> Request<Body> {
    Request::builder()
        .uri("/api/health")
        .header("X-Forwarded-For", ip)
        .body(Body::empty())
        .unwrap()
}

async fn limited_app(max_requests: u32, login_max_requests: u32) -> TestApp {
    let mut config = test_config();
    config.rate_limit.enabled = true;
    config.rate_limit.max_requests = max_requests;
    config.rate_limit.login_max_requests = login_max_requests;
    TestApp::with_config(config).await
}

#[tokio::test]
async fn test_login_attempts_are_limited_per_client() {
    let app = limited_app(100, 2).await;

    for _ in 0..2 {
        let response = app.send(login_from("10.0.0.1")).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }
    let blocked = app.send(login_from("10.0.0.1")).await;
    assert_eq!(blocked.status, StatusCode::TOO_MANY_REQUESTS);
    assert!(!blocked.success());
    assert_eq!(
        blocked.message(),
        "Too many login attempts, please try again later"
    );
    assert!(blocked.headers.contains_key(header::RETRY_AFTER));

    let other_client = app.send(login_from("10.0.0.2")).await;
    assert_eq!(other_client.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_global_limit_applies_to_every_route() {
    let app = limited_app(3, 5).await;

    for _ in 0..3 {
        assert_eq!(app.send(health_from("10.0.0.9")).await.status, StatusCode::OK);
    }
    let blocked = app.send(health_from("10.0.0.9")).await;
    assert_eq!(blocked.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        blocked.message(),
        "Too many requests, please try again later"
    );
}

#[tokio::test]
async fn test_disabled_limiter_never_blocks() {
    let app = TestApp::new().await;

    for _ in 0..20 {
        assert_eq!(app.send(health_from("10.0.0.9")).await.status, StatusCode::OK);
    }
}
