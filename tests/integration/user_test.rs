//! User administration endpoints.

use http::StatusCode;
use serde_json::json;

use crate::helpers::{PASSWORD, TestApp};

#[tokio::test]
async fn test_create_get_and_list_users() {
    let app = TestApp::new().await;
    let (_, token) = app.admin_token().await;
    let user_role = app.role_id("USER").await;

    let created = app
        .request(
            "POST",
            "/api/user",
            Some(json!({
                "username": "alice",
                "password": "secret1",
                "email": "alice@example.com",
                "realName": "Alice",
                "roleIds": [user_role],
            })),
            Some(&token),
        )
        .await;
    assert_eq!(created.status, StatusCode::OK, "{}", created.body);
    assert_eq!(created.message(), "User created");
    let id = created.body["data"]["id"].as_i64().unwrap();
    assert_eq!(created.body["data"]["roles"][0]["roleCode"], "USER");
    assert!(created.body["data"].get("passwordHash").is_none());

    let fetched = app
        .request("GET", &format!("/api/user/{id}"), None, Some(&token))
        .await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["data"]["realName"], "Alice");

    let listed = app
        .request(
            "GET",
            "/api/user/list?page=1&pageSize=10&username=ali",
            None,
            Some(&token),
        )
        .await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.body["data"]["total"], 1);
    assert_eq!(listed.body["data"]["list"][0]["username"], "alice");
}

#[tokio::test]
async fn test_create_duplicate_username_is_bad_request() {
    let app = TestApp::new().await;
    let (_, token) = app.admin_token().await;

    let response = app
        .request(
            "POST",
            "/api/user",
            Some(json!({ "username": "admin", "password": "secret1" })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(!response.success());
}

#[tokio::test]
async fn test_missing_and_malformed_ids() {
    let app = TestApp::new().await;
    let (_, token) = app.admin_token().await;

    let missing = app
        .request("GET", "/api/user/9999", None, Some(&token))
        .await;
    let malformed = app
        .request("GET", "/api/user/abc", None, Some(&token))
        .await;
    let zero = app.request("GET", "/api/user/0", None, Some(&token)).await;

    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
    assert_eq!(zero.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_replaces_roles() {
    let app = TestApp::new().await;
    let (_, token) = app.admin_token().await;
    let alice = app.create_user("alice", &["USER"]).await;
    let admin_role = app.role_id("ADMIN").await;

    let response = app
        .request(
            "PUT",
            &format!("/api/user/{}", alice.id),
            Some(json!({ "phone": "555-0100", "roleIds": [admin_role] })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    let roles = response.body["data"]["roles"].as_array().unwrap();
    assert_eq!(roles.len(), 1);
    assert_eq!(roles[0]["roleCode"], "ADMIN");
    assert_eq!(response.body["data"]["phone"], "555-0100");
}

#[tokio::test]
async fn test_cannot_delete_or_disable_self() {
    let app = TestApp::new().await;
    let (admin, token) = app.admin_token().await;

    let delete = app
        .request("DELETE", &format!("/api/user/{}", admin.id), None, Some(&token))
        .await;
    let disable = app
        .request(
            "PATCH",
            &format!("/api/user/{}/status", admin.id),
            Some(json!({ "status": "disabled" })),
            Some(&token),
        )
        .await;

    assert_eq!(delete.status, StatusCode::BAD_REQUEST);
    assert_eq!(disable.status, StatusCode::BAD_REQUEST);

    let still_there = app
        .request("GET", &format!("/api/user/{}", admin.id), None, Some(&token))
        .await;
    assert_eq!(still_there.body["data"]["status"], "enabled");
}

#[tokio::test]
async fn test_delete_other_user() {
    let app = TestApp::new().await;
    let (_, token) = app.admin_token().await;
    let alice = app.create_user("alice", &["USER"]).await;

    let deleted = app
        .request("DELETE", &format!("/api/user/{}", alice.id), None, Some(&token))
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let gone = app
        .request("GET", &format!("/api/user/{}", alice.id), None, Some(&token))
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_disabled_user_cannot_log_in_or_use_token() {
    let app = TestApp::new().await;
    let (_, token) = app.admin_token().await;
    let alice = app.create_user("alice", &["ADMIN"]).await;
    let alice_token = app.login("alice", PASSWORD).await;

    let response = app
        .request(
            "PATCH",
            &format!("/api/user/{}/status", alice.id),
            Some(json!({ "status": "disabled" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "disabled");

    let login = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "alice", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(login.status, StatusCode::FORBIDDEN);

    // Permission checks read the store, so the old token loses its grants.
    let listed = app
        .request("GET", "/api/user/list", None, Some(&alice_token))
        .await;
    assert_eq!(listed.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_disabled_user_token_rejected_on_authenticated_routes() {
    let app = TestApp::new().await;
    let (_, token) = app.admin_token().await;
    let alice = app.create_user("alice", &["USER"]).await;
    let alice_token = app.login("alice", PASSWORD).await;

    let before = app
        .request("GET", "/api/auth/current", None, Some(&alice_token))
        .await;
    assert_eq!(before.status, StatusCode::OK);

    let response = app
        .request(
            "PATCH",
            &format!("/api/user/{}/status", alice.id),
            Some(json!({ "status": "disabled" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    for (method, uri) in [("GET", "/api/auth/current"), ("POST", "/api/auth/logout")] {
        let response = app.request(method, uri, None, Some(&alice_token)).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN, "{method} {uri}");
        assert_eq!(response.message(), "Account is disabled");
    }

    app.request(
        "PATCH",
        &format!("/api/user/{}/status", alice.id),
        Some(json!({ "status": "enabled" })),
        Some(&token),
    )
    .await;
    let after = app
        .request("GET", "/api/auth/current", None, Some(&alice_token))
        .await;
    assert_eq!(after.status, StatusCode::OK);
}

#[tokio::test]
async fn test_reset_password() {
    let app = TestApp::new().await;
    let (_, token) = app.admin_token().await;
    let alice = app.create_user("alice", &[]).await;

    let response = app
        .request(
            "POST",
            &format!("/api/user/{}/reset-password", alice.id),
            Some(json!({ "newPassword": "another1" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let old = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "alice", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(old.status, StatusCode::UNAUTHORIZED);
    app.login("alice", "another1").await;
}

#[tokio::test]
async fn test_user_management_requires_permission() {
    let app = TestApp::new().await;
    app.create_user("alice", &["USER"]).await;
    let token = app.login("alice", PASSWORD).await;

    let response = app
        .request("GET", "/api/user/list", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.message(), "Permission denied: user:manage required");
}

#[tokio::test]
async fn test_create_with_unknown_role_leaves_no_user() {
    let app = TestApp::new().await;
    let (_, token) = app.admin_token().await;
    let body = |ids: serde_json::Value| {
        json!({ "username": "bob", "password": "secret1", "roleIds": ids })
    };

    let rejected = app
        .request("POST", "/api/user", Some(body(json!([999_999]))), Some(&token))
        .await;
    assert_eq!(rejected.status, StatusCode::BAD_REQUEST);
    assert_eq!(rejected.message(), "Referenced role or permission does not exist");

    let retried = app
        .request("POST", "/api/user", Some(body(json!([]))), Some(&token))
        .await;
    assert_eq!(retried.status, StatusCode::OK, "{}", retried.body);
    assert_eq!(retried.body["data"]["username"], "bob");
}

#[tokio::test]
async fn test_update_with_unknown_role_changes_nothing() {
    let app = TestApp::new().await;
    let (_, token) = app.admin_token().await;
    let bob = app.create_user("bob", &["USER"]).await;

    let rejected = app
        .request(
            "PUT",
            &format!("/api/user/{}", bob.id),
            Some(json!({ "realName": "Robert", "roleIds": [999_999] })),
            Some(&token),
        )
        .await;
    assert_eq!(rejected.status, StatusCode::BAD_REQUEST);

    let fetched = app
        .request("GET", &format!("/api/user/{}", bob.id), None, Some(&token))
        .await;
    assert!(fetched.body["data"]["realName"].is_null());
    assert_eq!(fetched.body["data"]["roles"][0]["roleCode"], "USER");
}
