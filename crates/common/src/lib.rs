// ================
// common/src/lib.rs
// ================
//! Common types shared between the portal's authentication core and the
//! HTTP layer that fronts it.
//! This module defines the login request/response bodies and the session
//! token payload.

use serde::{Deserialize, Serialize};

/// User identifier as assigned by the partner content-management platform.
pub type UserId = i64;

/// Credential row supplied by the external user directory.
///
/// The core only ever reads these; creation and updates happen upstream.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    /// Login name the user types in
    pub identifier: String,
    /// Platform user id, copied into issued tokens
    pub user_id: UserId,
    /// Portable hash string (`$P$...` / `$H$...`)
    pub stored_hash: String,
}

/// Payload carried inside a signed session token.
///
/// Field order matters: it is the serialized order of the token payload.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub user_id: UserId,
    pub username: String,
    /// Expiry as Unix seconds
    pub exp: i64,
}

/// Body of `POST /api/auth`
///
/// Both fields are optional on the wire so that a missing field can be
/// reported as a validation error instead of a deserialization failure.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Successful login response
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub username: String,
}

/// Response of `GET /api/session`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SessionResponse {
    pub success: bool,
    pub user_id: UserId,
    pub username: String,
    pub exp: i64,
}
