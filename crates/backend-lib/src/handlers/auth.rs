// ============================
// portal-auth/src/handlers/auth.rs
// ============================
//! Login and session introspection endpoints.
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use portal_common::{LoginRequest, LoginResponse, SessionClaims, SessionResponse};
use tracing::debug;

use crate::error::AppError;
use crate::AppState;

/// `POST /api/auth`
///
/// Trims both fields before checking them, as the front-end sends whatever
/// the user typed.
pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(request) = body.map_err(|e| AppError::InvalidInput(e.body_text()))?;

    let username = request.username.as_deref().map(str::trim).unwrap_or_default();
    let password = request.password.as_deref().map(str::trim).unwrap_or_default();
    if username.is_empty() || password.is_empty() {
        return Err(AppError::InvalidInput("username and password are required".to_string()));
    }

    debug!(username, "login attempt");
    let token = state
        .auth
        .authenticate(username, password, state.directory.as_ref())
        .await?;

    Ok(Json(LoginResponse {
        success: true,
        token,
        username: username.to_string(),
    }))
}

/// `GET /api/session`, behind [`require_session`](crate::middleware::require_session)
pub async fn session(Extension(claims): Extension<SessionClaims>) -> Json<SessionResponse> {
    Json(SessionResponse {
        success: true,
        user_id: claims.user_id,
        username: claims.username,
        exp: claims.exp,
    })
}

/// `GET /health`
pub async fn health() -> &'static str {
    "ok"
}
