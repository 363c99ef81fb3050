mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let app = common::TestApp::new();

    let (status, body) = app.send(Method::GET, "/health", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn root_describes_service() -> Result<()> {
    let app = common::TestApp::new();

    let (status, body) = app.send(Method::GET, "/", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["data"]["version"].is_string());
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_bearer_token() -> Result<()> {
    let app = common::TestApp::new();

    for (method, uri) in [
        (Method::GET, "/api/admin/requests"),
        (Method::POST, "/api/admin/requests"),
        (Method::GET, "/api/admin/users"),
    ] {
        let (status, body) = app.send(method, uri, None, None).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    let (status, _) = app
        .send(Method::GET, "/api/admin/users", Some("not-a-jwt"), None)
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}
