//! Permission tree and hierarchy rules.

use http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_tree_nests_builtin_menus() {
    let app = TestApp::new().await;
    let (_, token) = app.admin_token().await;

    let response = app
        .request("GET", "/api/permission/tree", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let roots = response.body["data"].as_array().unwrap();
    assert_eq!(roots.len(), 2);
    assert_eq!(roots[0]["permissionCode"], "dashboard:view");
    assert_eq!(roots[1]["permissionCode"], "system");
    let children: Vec<&str> = roots[1]["children"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["permissionCode"].as_str().unwrap())
        .collect();
    assert_eq!(
        children,
        vec!["user:manage", "role:manage", "permission:manage", "log:manage"]
    );
}

#[tokio::test]
async fn test_all_is_flat_and_ordered() {
    let app = TestApp::new().await;
    let (_, token) = app.admin_token().await;

    let response = app
        .request("GET", "/api/permission/all", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn test_create_requires_existing_parent_and_unique_code() {
    let app = TestApp::new().await;
    let (_, token) = app.admin_token().await;

    let orphan = app
        .request(
            "POST",
            "/api/permission",
            Some(json!({
                "permissionName": "Orphan",
                "permissionCode": "orphan:view",
                "parentId": 9999,
            })),
            Some(&token),
        )
        .await;
    assert_eq!(orphan.status, StatusCode::BAD_REQUEST);

    let duplicate = app
        .request(
            "POST",
            "/api/permission",
            Some(json!({ "permissionName": "Again", "permissionCode": "user:manage" })),
            Some(&token),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::BAD_REQUEST);

    let root = app
        .request(
            "POST",
            "/api/permission",
            Some(json!({
                "permissionName": "Reports",
                "permissionCode": "report:view",
                "parentId": 0,
                "sortOrder": 9,
            })),
            Some(&token),
        )
        .await;
    assert_eq!(root.status, StatusCode::OK, "{}", root.body);
    assert_eq!(root.body["data"]["parentId"], 0);
}

#[tokio::test]
async fn test_delete_with_children_is_rejected() {
    let app = TestApp::new().await;
    let (_, token) = app.admin_token().await;
    let system = app.permission_id("system").await;

    let response = app
        .request(
            "DELETE",
            &format!("/api/permission/{system}"),
            None,
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_leaf_then_missing() {
    let app = TestApp::new().await;
    let (_, token) = app.admin_token().await;
    let logs = app.permission_id("log:manage").await;

    let deleted = app
        .request("DELETE", &format!("/api/permission/{logs}"), None, Some(&token))
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let missing = app
        .request("GET", &format!("/api/permission/{logs}"), None, Some(&token))
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_rejects_cycles() {
    let app = TestApp::new().await;
    let (_, token) = app.admin_token().await;
    let system = app.permission_id("system").await;
    let users = app.permission_id("user:manage").await;

    let under_child = app
        .request(
            "PUT",
            &format!("/api/permission/{system}"),
            Some(json!({ "parentId": users })),
            Some(&token),
        )
        .await;
    let under_self = app
        .request(
            "PUT",
            &format!("/api/permission/{system}"),
            Some(json!({ "parentId": system })),
            Some(&token),
        )
        .await;

    assert_eq!(under_child.status, StatusCode::BAD_REQUEST);
    assert_eq!(under_self.status, StatusCode::BAD_REQUEST);

    let renamed = app
        .request(
            "PUT",
            &format!("/api/permission/{users}"),
            Some(json!({ "permissionName": "People", "icon": "people" })),
            Some(&token),
        )
        .await;
    assert_eq!(renamed.status, StatusCode::OK);
    assert_eq!(renamed.body["data"]["permissionName"], "People");
    assert_eq!(renamed.body["data"]["permissionCode"], "user:manage");
}
