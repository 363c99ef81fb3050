mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn submit_then_duplicate_is_refused() -> Result<()> {
    let app = common::TestApp::new();
    app.admin("alice").await?;
    let carol = app.user("carol").await?;

    let (status, body) = app.get("/api/admin/requests/eligibility", &carol).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["eligible"], true);

    let (status, body) = app
        .post("/api/admin/requests", &carol, json!({ "message": "I write a lot" }))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["message"], "I write a lot");

    let (status, body) = app.post("/api/admin/requests", &carol, json!({})).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "DUPLICATE_REQUEST");

    let (status, body) = app.get("/api/admin/requests/eligibility", &carol).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "DUPLICATE_REQUEST");
    Ok(())
}

#[tokio::test]
async fn admins_cannot_submit() -> Result<()> {
    let app = common::TestApp::new();
    let alice = app.admin("alice").await?;

    let (status, body) = app.post("/api/admin/requests", &alice, json!({})).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "ALREADY_ADMIN");
    Ok(())
}

#[tokio::test]
async fn token_for_unknown_user_is_unauthenticated() -> Result<()> {
    let app = common::TestApp::new();
    let other = common::TestApp::new();
    // Valid signature, but the user only exists in the other store
    let ghost = other.user("ghost").await?;

    let (status, _) = app.post("/api/admin/requests", &ghost, json!({})).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn pending_list_is_admin_only() -> Result<()> {
    let app = common::TestApp::new();
    let alice = app.admin("alice").await?;
    app.admin("bob").await?;
    let carol = app.user("carol").await?;
    let request_id = app.submit(&carol).await?;
    app.vote(request_id, &alice, true).await?;

    let (status, _) = app.get("/api/admin/requests", &carol).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.get("/api/admin/requests", &alice).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_admins"], 2);
    let requests = body["data"]["requests"].as_array().cloned().unwrap_or_default();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["requester_name"], "carol");
    assert_eq!(requests[0]["approval_count"], 1);
    Ok(())
}
