// handlers/protected/requests.rs - Admin promotion requests and voting
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::app::AppState;
use crate::approval::{PendingOverview, VoteOutcome};
use crate::database::models::AdminRequest;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Default, Deserialize)]
pub struct SubmitBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VoteBody {
    pub approve: bool,
}

/// GET /api/admin/requests/eligibility - can the caller ask for promotion
pub async fn eligibility(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Value> {
    state.approvals.check_eligibility(user.user_id).await?;
    Ok(ApiResponse::success(json!({ "eligible": true })))
}

/// POST /api/admin/requests - ask to become an administrator
pub async fn submit(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<SubmitBody>,
) -> ApiResult<AdminRequest> {
    let request = state.approvals.submit_request(user.user_id, body.message).await?;
    Ok(ApiResponse::created(request)
        .with_message("Your admin request has been submitted. All current admins must approve."))
}

/// GET /api/admin/requests - pending requests with tally
pub async fn list_pending(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<PendingOverview> {
    let overview = state.approvals.list_pending(user.user_id).await?;
    Ok(ApiResponse::success(overview))
}

/// POST /api/admin/requests/:id/votes - approve or reject
pub async fn cast_vote(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(request_id): Path<Uuid>,
    Json(body): Json<VoteBody>,
) -> ApiResult<VoteOutcome> {
    let outcome = state
        .approvals
        .cast_vote(request_id, user.user_id, body.approve)
        .await?;
    let message = outcome.summary();
    Ok(ApiResponse::success(outcome).with_message(message))
}
