//! The route access table against the live router.

use http::StatusCode;

use gatehouse_api::access::{Access, ROUTE_ACCESS};

use crate::helpers::{PASSWORD, TestApp};

fn concrete(path: &str) -> String {
    path.replace("{id}", "999999")
}

#[tokio::test]
async fn test_protected_routes_reject_missing_token() {
    let app = TestApp::new().await;

    for route in ROUTE_ACCESS
        .iter()
        .filter(|r| r.access != Access::Public)
    {
        let response = app
            .request(route.method, &concrete(route.path), None, None)
            .await;
        assert_eq!(
            response.status,
            StatusCode::UNAUTHORIZED,
            "{} {}",
            route.method,
            route.path
        );
        assert!(!response.success());
    }
}

#[tokio::test]
async fn test_permission_routes_reject_users_without_grant() {
    let app = TestApp::new().await;
    app.create_user("alice", &["USER"]).await;
    let token = app.login("alice", PASSWORD).await;

    for route in ROUTE_ACCESS.iter() {
        let Access::Permission(code) = route.access else {
            continue;
        };
        if code == gatehouse_api::access::DASHBOARD_VIEW {
            continue;
        }
        let response = app
            .request(route.method, &concrete(route.path), None, Some(&token))
            .await;
        assert_eq!(
            response.status,
            StatusCode::FORBIDDEN,
            "{} {}",
            route.method,
            route.path
        );
        assert_eq!(
            response.message(),
            format!("Permission denied: {code} required")
        );
    }
}

#[tokio::test]
async fn test_every_listed_route_is_registered() {
    let app = TestApp::new().await;
    let (_, token) = app.admin_token().await;

    for route in ROUTE_ACCESS.iter() {
        let response = app
            .request(route.method, &concrete(route.path), None, Some(&token))
            .await;
        assert_ne!(
            response.message(),
            "The requested resource does not exist",
            "{} {} is not routed",
            route.method,
            route.path
        );
        assert_ne!(response.status, StatusCode::METHOD_NOT_ALLOWED);
    }
}
