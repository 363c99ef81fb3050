mod common;

use anyhow::Result;
use axum::http::StatusCode;
use uuid::Uuid;

#[tokio::test]
async fn single_rejection_settles_request() -> Result<()> {
    let app = common::TestApp::new();
    let alice = app.admin("alice").await?;
    let bob = app.admin("bob").await?;
    let dave = app.admin("dave").await?;
    let carol = app.user("carol").await?;
    let request_id = app.submit(&carol).await?;

    let (status, body) = app.vote(request_id, &alice, true).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["decision"]["outcome"], "pending");
    assert_eq!(body["message"], "Vote recorded. 1/3 approvals.");

    let (status, body) = app.vote(request_id, &bob, false).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["decision"]["outcome"], "rejected");
    assert_eq!(body["message"], "Request has been rejected.");

    let (status, body) = app.vote(request_id, &dave, true).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "REQUEST_NOT_ACTIONABLE");

    assert!(!app.is_admin(carol.id).await?);

    // A fresh request is allowed once the old one is resolved
    app.submit(&carol).await?;
    Ok(())
}

#[tokio::test]
async fn unanimous_approval_promotes() -> Result<()> {
    let app = common::TestApp::new();
    let alice = app.admin("alice").await?;
    let bob = app.admin("bob").await?;
    let carol = app.user("carol").await?;
    let request_id = app.submit(&carol).await?;

    let (_, body) = app.vote(request_id, &alice, true).await?;
    assert_eq!(body["message"], "Vote recorded. 1/2 approvals.");

    let (status, body) = app.vote(request_id, &bob, true).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["decision"]["outcome"], "approved");
    assert_eq!(body["message"], "Request approved! User is now an admin.");
    assert!(app.is_admin(carol.id).await?);

    // The promoted user can now review requests
    let (status, _) = app.get("/api/admin/requests", &carol).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn vote_errors() -> Result<()> {
    let app = common::TestApp::new();
    let alice = app.admin("alice").await?;
    app.admin("bob").await?;
    let carol = app.user("carol").await?;
    let eve = app.user("eve").await?;
    let request_id = app.submit(&carol).await?;

    let (status, _) = app.vote(request_id, &eve, true).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    app.vote(request_id, &alice, true).await?;
    let (status, body) = app.vote(request_id, &alice, false).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "DUPLICATE_VOTE");

    let (status, body) = app.vote(Uuid::new_v4(), &alice, true).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "REQUEST_NOT_ACTIONABLE");

    let (status, _) = app
        .post(
            &format!("/api/admin/requests/{}/votes", request_id),
            &alice,
            serde_json::json!({ "approve": "maybe" }),
        )
        .await?;
    assert!(status.is_client_error());
    Ok(())
}

#[tokio::test]
async fn removing_an_admin_lowers_the_threshold() -> Result<()> {
    let app = common::TestApp::new();
    let alice = app.admin("alice").await?;
    let bob = app.admin("bob").await?;
    let dave = app.admin("dave").await?;
    let carol = app.user("carol").await?;
    let request_id = app.submit(&carol).await?;

    let (_, body) = app.vote(request_id, &alice, true).await?;
    assert_eq!(body["message"], "Vote recorded. 1/3 approvals.");

    let (status, _) = app.delete(&format!("/api/admin/users/{}/admin", dave.id), &alice).await?;
    assert_eq!(status, StatusCode::OK);

    // Demoted admins can no longer vote
    let (status, _) = app.vote(request_id, &dave, true).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Two approvals now satisfy the two remaining admins
    let (status, body) = app.vote(request_id, &bob, true).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["decision"]["outcome"], "approved");
    assert_eq!(body["data"]["decision"]["total_admins"], 2);
    assert!(app.is_admin(carol.id).await?);
    Ok(())
}
