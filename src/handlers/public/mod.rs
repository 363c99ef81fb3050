// handlers/public/mod.rs - Endpoints that need no authentication
use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};

use crate::app::AppState;

/// GET / - service description
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Blog Admin API",
            "version": version,
            "description": "Blog backend with unanimous approval of administrator promotions",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "requests": "/api/admin/requests[/:id/votes] (protected)",
                "eligibility": "/api/admin/requests/eligibility (protected)",
                "users": "/api/admin/users[/:id[/admin]] (protected, administrators)",
            }
        }
    }))
}

/// GET /health - storage connectivity
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "Storage is unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
