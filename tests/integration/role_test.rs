//! Role administration and the end-to-end grant scenario.

use http::StatusCode;
use serde_json::json;

use gatehouse_auth::Decision;

use crate::helpers::{PASSWORD, TestApp};

#[tokio::test]
async fn test_editor_role_grants_exactly_its_permissions() {
    let app = TestApp::new().await;
    let (_, token) = app.admin_token().await;
    let user_manage = app.permission_id("user:manage").await;

    // Register alice, then hand her an EDITOR role holding only user:list.
    let registered = app
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({ "username": "alice", "password": "secret1" })),
            None,
        )
        .await;
    assert_eq!(registered.status, StatusCode::CREATED);
    let alice_id = registered.body["data"]["id"].as_i64().unwrap();

    let permission = app
        .request(
            "POST",
            "/api/permission",
            Some(json!({
                "permissionName": "List users",
                "permissionCode": "user:list",
                "permissionType": "button",
                "parentId": user_manage,
            })),
            Some(&token),
        )
        .await;
    assert_eq!(permission.status, StatusCode::OK, "{}", permission.body);
    let user_list = permission.body["data"]["id"].as_i64().unwrap();

    let role = app
        .request(
            "POST",
            "/api/role",
            Some(json!({
                "roleName": "editor",
                "roleCode": "EDITOR",
                "permissionIds": [user_list],
            })),
            Some(&token),
        )
        .await;
    assert_eq!(role.status, StatusCode::OK, "{}", role.body);
    let editor = role.body["data"]["id"].as_i64().unwrap();

    let assigned = app
        .request(
            "PUT",
            &format!("/api/user/{alice_id}"),
            Some(json!({ "roleIds": [editor] })),
            Some(&token),
        )
        .await;
    assert_eq!(assigned.status, StatusCode::OK);

    let engine = &app.state.engine;
    assert_eq!(
        engine.authorize(alice_id, "user:list").await.unwrap(),
        Decision::Allow
    );
    assert_eq!(
        engine.authorize(alice_id, "user:delete").await.unwrap(),
        Decision::Deny
    );
}

#[tokio::test]
async fn test_create_role_reads_back_permissions() {
    let app = TestApp::new().await;
    let (_, token) = app.admin_token().await;
    let dashboard = app.permission_id("dashboard:view").await;
    let logs = app.permission_id("log:manage").await;

    let created = app
        .request(
            "POST",
            "/api/role",
            Some(json!({
                "roleName": "Auditor",
                "roleCode": "AUDITOR",
                "description": "Reads logs",
                "permissionIds": [logs, dashboard],
            })),
            Some(&token),
        )
        .await;
    assert_eq!(created.status, StatusCode::OK);
    let id = created.body["data"]["id"].as_i64().unwrap();

    let fetched = app
        .request("GET", &format!("/api/role/{id}"), None, Some(&token))
        .await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["data"]["roleCode"], "AUDITOR");
    let codes: Vec<&str> = fetched.body["data"]["permissions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["permissionCode"].as_str().unwrap())
        .collect();
    assert_eq!(codes.len(), 2);
    assert!(codes.contains(&"dashboard:view"));
    assert!(codes.contains(&"log:manage"));
}

#[tokio::test]
async fn test_duplicate_role_code_is_bad_request() {
    let app = TestApp::new().await;
    let (_, token) = app.admin_token().await;

    let response = app
        .request(
            "POST",
            "/api/role",
            Some(json!({ "roleName": "Another admin", "roleCode": "ADMIN" })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_role_with_users_is_rejected() {
    let app = TestApp::new().await;
    let (_, token) = app.admin_token().await;
    let admin_role = app.role_id("ADMIN").await;

    let response = app
        .request("DELETE", &format!("/api/role/{admin_role}"), None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(!response.success());
}

#[tokio::test]
async fn test_delete_unused_role() {
    let app = TestApp::new().await;
    let (_, token) = app.admin_token().await;
    let user_role = app.role_id("USER").await;

    let deleted = app
        .request("DELETE", &format!("/api/role/{user_role}"), None, Some(&token))
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let missing = app
        .request("DELETE", &format!("/api/role/{user_role}"), None, Some(&token))
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_disabling_a_role_revokes_its_grants() {
    let app = TestApp::new().await;
    let (_, token) = app.admin_token().await;
    app.create_user("alice", &["USER"]).await;
    let alice_token = app.login("alice", PASSWORD).await;
    let user_role = app.role_id("USER").await;

    let before = app
        .request("GET", "/api/dashboard/stats", None, Some(&alice_token))
        .await;
    assert_eq!(before.status, StatusCode::OK);

    let disabled = app
        .request(
            "PUT",
            &format!("/api/role/{user_role}"),
            Some(json!({ "status": "disabled" })),
            Some(&token),
        )
        .await;
    assert_eq!(disabled.status, StatusCode::OK);

    let after = app
        .request("GET", "/api/dashboard/stats", None, Some(&alice_token))
        .await;
    assert_eq!(after.status, StatusCode::FORBIDDEN);

    let enabled_only = app
        .request("GET", "/api/role/all", None, Some(&token))
        .await;
    let codes: Vec<&str> = enabled_only.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["roleCode"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["ADMIN"]);
}

#[tokio::test]
async fn test_role_list_filters_by_name() {
    let app = TestApp::new().await;
    let (_, token) = app.admin_token().await;

    let response = app
        .request("GET", "/api/role/list?roleName=Admin", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["total"], 1);
    assert_eq!(response.body["data"]["list"][0]["roleCode"], "ADMIN");
}

#[tokio::test]
async fn test_dashboard_stats() {
    let app = TestApp::new().await;
    let (_, token) = app.admin_token().await;

    let response = app
        .request("GET", "/api/dashboard/stats", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["userCount"], 1);
    assert_eq!(response.body["data"]["roleCount"], 2);
    assert_eq!(response.body["data"]["permissionCount"], 6);
}

#[tokio::test]
async fn test_create_with_unknown_permission_leaves_no_role() {
    let app = TestApp::new().await;
    let (_, token) = app.admin_token().await;
    let body = |ids: serde_json::Value| {
        json!({ "roleName": "editor", "roleCode": "EDITOR", "permissionIds": ids })
    };

    let rejected = app
        .request("POST", "/api/role", Some(body(json!([999_999]))), Some(&token))
        .await;
    assert_eq!(rejected.status, StatusCode::BAD_REQUEST);
    assert_eq!(rejected.message(), "Referenced role or permission does not exist");

    let retried = app
        .request("POST", "/api/role", Some(body(json!([]))), Some(&token))
        .await;
    assert_eq!(retried.status, StatusCode::OK, "{}", retried.body);
    assert_eq!(retried.body["data"]["roleCode"], "EDITOR");
}

#[tokio::test]
async fn test_update_with_unknown_permission_changes_nothing() {
    let app = TestApp::new().await;
    let (_, token) = app.admin_token().await;
    let user_role = app.role_id("USER").await;

    let rejected = app
        .request(
            "PUT",
            &format!("/api/role/{user_role}"),
            Some(json!({ "roleName": "Renamed", "permissionIds": [999_999] })),
            Some(&token),
        )
        .await;
    assert_eq!(rejected.status, StatusCode::BAD_REQUEST);

    let fetched = app
        .request("GET", &format!("/api/role/{user_role}"), None, Some(&token))
        .await;
    assert_eq!(fetched.body["data"]["roleName"], "User");
    let codes: Vec<&str> = fetched.body["data"]["permissions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["permissionCode"].as_str().unwrap())
        .collect();
    assert_eq!(codes, ["dashboard:view"]);
}
