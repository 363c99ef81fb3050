use axum::{
    http::HeaderValue,
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::approval::{ApprovalEngine, RequestLocks};
use crate::config::AppConfig;
use crate::database::{Backend, RequestStore};
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::services::AdminService;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub approvals: Arc<ApprovalEngine>,
    pub admin: Arc<AdminService>,
    pub store: Arc<dyn RequestStore>,
}

impl AppState {
    /// Both services share one lock table so votes and deletions on the
    /// same request are serialized against each other
    pub fn new(backend: Backend) -> Self {
        let locks = Arc::new(RequestLocks::new());
        Self {
            approvals: Arc::new(ApprovalEngine::new(&backend, locks.clone())),
            admin: Arc::new(AdminService::new(&backend, locks)),
            store: backend.requests,
        }
    }
}

pub fn app(state: AppState, config: &AppConfig) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        // Protected
        .merge(admin_routes());

    // Global middleware
    if config.security.enable_cors {
        router = router.layer(cors_layer(config));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn admin_routes() -> Router<AppState> {
    use protected::{requests, users};

    Router::new()
        // Promotion requests and voting
        .route("/api/admin/requests", get(requests::list_pending).post(requests::submit))
        .route("/api/admin/requests/eligibility", get(requests::eligibility))
        .route("/api/admin/requests/:id/votes", post(requests::cast_vote))
        // User management
        .route("/api/admin/users", get(users::list))
        .route("/api/admin/users/:id", delete(users::delete_user))
        .route("/api/admin/users/:id/admin", delete(users::remove_admin))
        .route_layer(middleware::from_fn(jwt_auth_middleware))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
