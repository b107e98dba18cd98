//! Registration, login and current-user flow.

use http::StatusCode;
use serde_json::json;

use gatehouse_database::UserStore;
use gatehouse_entity::Status;
use gatehouse_entity::user::UserChanges;

use crate::helpers::{PASSWORD, TestApp};

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.success());
    assert_eq!(response.body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_register_then_duplicate() {
    let app = TestApp::new().await;
    let body = json!({ "username": "alice", "password": "secret1", "email": "alice@example.com" });

    let first = app
        .request("POST", "/api/auth/register", Some(body.clone()), None)
        .await;
    assert_eq!(first.status, StatusCode::CREATED);
    assert!(first.success());
    assert_eq!(first.body["data"]["username"], "alice");

    let second = app
        .request("POST", "/api/auth/register", Some(body), None)
        .await;
    assert_eq!(second.status, StatusCode::BAD_REQUEST);
    assert!(!second.success());
}

#[tokio::test]
async fn test_register_validation_errors_name_fields() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({ "username": "al", "password": "secret1", "email": "not-an-email" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["errors"]["username"].is_array());
    assert!(response.body["errors"]["email"].is_array());
}

#[tokio::test]
async fn test_register_empty_email_is_absent() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({ "username": "bob", "password": "secret1", "email": "" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert!(response.body["data"]["email"].is_null());
}

#[tokio::test]
async fn test_registered_user_gets_default_role() {
    let app = TestApp::new().await;
    app.request(
        "POST",
        "/api/auth/register",
        Some(json!({ "username": "alice", "password": "secret1" })),
        None,
    )
    .await;

    let token = app.login("alice", "secret1").await;
    let current = app
        .request("GET", "/api/auth/current", None, Some(&token))
        .await;

    assert_eq!(current.status, StatusCode::OK);
    assert_eq!(current.body["data"]["roles"][0]["roleCode"], "USER");
    assert_eq!(current.body["data"]["permissions"], json!(["dashboard:view"]));
}

#[tokio::test]
async fn test_login_returns_token_and_profile() {
    let app = TestApp::new().await;
    app.create_user("carol", &["ADMIN"]).await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "carol", "password": PASSWORD })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.message(), "Login successful");
    assert!(response.body["data"]["token"].is_string());
    assert!(response.body["data"]["expiresAt"].is_string());
    assert_eq!(response.body["data"]["user"]["username"], "carol");
    let permissions = response.body["data"]["user"]["permissions"]
        .as_array()
        .unwrap();
    assert!(permissions.contains(&json!("user:manage")));
}

#[tokio::test]
async fn test_login_wrong_password_and_unknown_user() {
    let app = TestApp::new().await;
    app.create_user("alice", &[]).await;

    let wrong = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "alice", "password": "nope-nope" })),
            None,
        )
        .await;
    let unknown = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "nobody", "password": "nope-nope" })),
            None,
        )
        .await;

    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.message(), unknown.message());
}

#[tokio::test]
async fn test_login_disabled_account_is_forbidden() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", &[]).await;
    UserStore::update(
        &app.store,
        alice.id,
        &UserChanges {
            status: Some(Status::Disabled),
            ..UserChanges::default()
        },
    )
    .await
    .unwrap();

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "alice", "password": PASSWORD })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_login_stamps_last_login() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", &[]).await;
    app.login("alice", PASSWORD).await;

    let stored = UserStore::find_by_id(&app.store, alice.id)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.last_login_time.is_some());
    assert!(stored.last_login_ip.is_some());
}

#[tokio::test]
async fn test_current_and_logout_require_token() {
    let app = TestApp::new().await;

    let current = app.request("GET", "/api/auth/current", None, None).await;
    let logout = app.request("POST", "/api/auth/logout", None, None).await;
    let garbage = app
        .request("GET", "/api/auth/current", None, Some("not-a-jwt"))
        .await;

    assert_eq!(current.status, StatusCode::UNAUTHORIZED);
    assert_eq!(logout.status, StatusCode::UNAUTHORIZED);
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
    assert!(!garbage.success());
}

#[tokio::test]
async fn test_logout_with_token() {
    let app = TestApp::new().await;
    app.create_user("alice", &[]).await;
    let token = app.login("alice", PASSWORD).await;

    let response = app
        .request("POST", "/api/auth/logout", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.success());
}

#[tokio::test]
async fn test_unknown_route_returns_envelope() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/nowhere", None, None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(!response.success());
    assert_eq!(response.message(), "The requested resource does not exist");
}
