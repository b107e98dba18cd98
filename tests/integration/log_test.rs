//! Operation log capture through the pipeline and its admin endpoints.

use http::StatusCode;
use serde_json::json;

use gatehouse_core::types::pagination::PageRequest;
use gatehouse_database::OperationLogStore;
use gatehouse_entity::operation_log::{OperationLog, OperationLogFilter, OperationOutcome};

use crate::helpers::{PASSWORD, TestApp};

async fn stored_logs(app: &TestApp) -> Vec<OperationLog> {
    OperationLogStore::list(
        &app.store,
        &OperationLogFilter::default(),
        &PageRequest::new(1, 100),
    )
    .await
    .unwrap()
    .list
}

fn find<'a>(logs: &'a [OperationLog], operation: &str) -> &'a OperationLog {
    logs.iter()
        .find(|l| l.operation == operation)
        .unwrap_or_else(|| panic!("no log entry for {operation}"))
}

#[tokio::test]
async fn test_login_is_logged_with_password_redacted() {
    let app = TestApp::new().await;
    app.create_user("alice", &[]).await;
    app.login("alice", PASSWORD).await;

    assert_eq!(app.wait_for_logs(1).await, 1);
    let logs = stored_logs(&app).await;
    let entry = find(&logs, "/api/auth/login");

    assert_eq!(entry.method, "POST");
    assert_eq!(entry.status, OperationOutcome::Success);
    assert!(entry.user_id.is_none());
    let params = entry.params.as_deref().unwrap();
    assert!(params.contains("alice"));
    assert!(!params.contains(PASSWORD));
    assert!(entry.result.is_some());
}

#[tokio::test]
async fn test_authenticated_request_records_actor_and_pattern() {
    let app = TestApp::new().await;
    let (admin, token) = app.admin_token().await;

    let response = app
        .request("GET", &format!("/api/user/{}", admin.id), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    app.wait_for_logs(2).await;
    let logs = stored_logs(&app).await;
    let entry = find(&logs, "/api/user/{id}");

    assert_eq!(entry.url, format!("/api/user/{}", admin.id));
    assert_eq!(entry.user_id, Some(admin.id));
    assert_eq!(entry.username.as_deref(), Some("admin"));
    assert_eq!(entry.status, OperationOutcome::Success);
    assert!(entry.execute_time >= 0);
}

#[tokio::test]
async fn test_denied_request_is_logged_as_failure_with_actor() {
    let app = TestApp::new().await;
    app.create_user("alice", &["USER"]).await;
    let token = app.login("alice", PASSWORD).await;

    let response = app
        .request("GET", "/api/role/list", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    app.wait_for_logs(2).await;
    let logs = stored_logs(&app).await;
    let entry = find(&logs, "/api/role/list");

    assert_eq!(entry.status, OperationOutcome::Failure);
    assert_eq!(entry.username.as_deref(), Some("alice"));
    assert_eq!(
        entry.error_msg.as_deref(),
        Some("Permission denied: role:manage required")
    );
}

#[tokio::test]
async fn test_unmatched_route_is_logged_by_path() {
    let app = TestApp::new().await;

    app.request("DELETE", "/api/missing/7", None, None).await;

    app.wait_for_logs(1).await;
    let logs = stored_logs(&app).await;
    let entry = find(&logs, "/api/missing/7");
    assert_eq!(entry.status, OperationOutcome::Failure);
}

#[tokio::test]
async fn test_log_endpoints_list_get_delete_clear() {
    let app = TestApp::new().await;
    let (_, token) = app.admin_token().await;
    app.request(
        "POST",
        "/api/auth/login",
        Some(json!({ "username": "admin", "password": "wrong-one" })),
        None,
    )
    .await;
    app.wait_for_logs(2).await;

    let failures = app
        .request("GET", "/api/log/list?status=failure", None, Some(&token))
        .await;
    assert_eq!(failures.status, StatusCode::OK);
    assert_eq!(failures.body["data"]["total"], 1);
    let id = failures.body["data"]["list"][0]["id"].as_i64().unwrap();
    assert_eq!(failures.body["data"]["list"][0]["status"], "failure");

    let fetched = app
        .request("GET", &format!("/api/log/{id}"), None, Some(&token))
        .await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["data"]["operation"], "/api/auth/login");

    let deleted = app
        .request("DELETE", &format!("/api/log/{id}"), None, Some(&token))
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    let again = app
        .request("DELETE", &format!("/api/log/{id}"), None, Some(&token))
        .await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);

    let cleared = app
        .request("DELETE", "/api/log/clear", None, Some(&token))
        .await;
    assert_eq!(cleared.status, StatusCode::OK);
    assert!(cleared.body["data"]["removed"].as_u64().unwrap() >= 1);
}

#[tokio::test]
async fn test_invalid_status_filter_is_bad_request() {
    let app = TestApp::new().await;
    let (_, token) = app.admin_token().await;

    let response = app
        .request("GET", "/api/log/list?status=maybe", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_disabled_logging_records_nothing() {
    let mut config = crate::helpers::test_config();
    config.operation_log.enabled = false;
    let app = TestApp::with_config(config).await;

    app.request("GET", "/api/health", None, None).await;
    tokio::time::sleep(std::time::Duration::from_millis(30)).await;

    assert_eq!(OperationLogStore::count(&app.store).await.unwrap(), 0);
}

#[tokio::test]
async fn test_repeated_status_change_logs_once_per_call() {
    let app = TestApp::new().await;
    let (_, token) = app.admin_token().await;
    let bob = app.create_user("bob", &["USER"]).await;
    let before = app.wait_for_logs(1).await;

    let uri = format!("/api/user/{}/status", bob.id);
    for _ in 0..2 {
        let response = app
            .request("PATCH", &uri, Some(json!({ "status": "disabled" })), Some(&token))
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["data"]["status"], "disabled");
    }

    assert_eq!(app.wait_for_logs(before + 2).await, before + 2);
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    let logs = stored_logs(&app).await;
    assert_eq!(logs.len() as u64, before + 2);
    let status_changes: Vec<_> = logs
        .iter()
        .filter(|l| l.operation == "/api/user/{id}/status")
        .collect();
    assert_eq!(status_changes.len(), 2);
    assert!(status_changes.iter().all(|l| l.status == OperationOutcome::Success));

    let fetched = app
        .request("GET", &format!("/api/user/{}", bob.id), None, Some(&token))
        .await;
    assert_eq!(fetched.body["data"]["status"], "disabled");
}
