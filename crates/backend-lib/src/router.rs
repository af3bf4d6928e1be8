// ============================
// portal-auth/src/router.rs
// ============================
//! HTTP router.
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers::auth;
use crate::middleware::require_session;
use crate::AppState;

/// Create the portal auth router
pub fn create_router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/api/session", get(auth::session))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    Router::new()
        .route("/api/auth", post(auth::login))
        .route("/health", get(auth::health))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
