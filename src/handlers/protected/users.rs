// handlers/protected/users.rs - User and role management
use axum::{
    extract::{Path, State},
    Extension,
};
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::{User, UserSummary};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /api/admin/users
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<UserSummary>> {
    Ok(ApiResponse::success(state.admin.list_users(user.user_id).await?))
}

/// DELETE /api/admin/users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(target): Path<Uuid>,
) -> ApiResult<User> {
    let deleted = state.admin.delete_user(user.user_id, target).await?;
    let message = format!("User '{}' has been deleted.", deleted.display_name);
    Ok(ApiResponse::success(deleted).with_message(message))
}

/// DELETE /api/admin/users/:id/admin
pub async fn remove_admin(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(target): Path<Uuid>,
) -> ApiResult<User> {
    let demoted = state.admin.remove_administrator(user.user_id, target).await?;
    let message = format!("Admin role removed from '{}'.", demoted.display_name);
    Ok(ApiResponse::success(demoted).with_message(message))
}
