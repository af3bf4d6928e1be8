use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::Response,
};

use crate::auth::extract_bearer;
use crate::error::AppError;
use crate::AppState;

/// Cookie the portal front-end stores the token in
pub const SESSION_COOKIE: &str = "auth_token";

/// Reject requests without a valid session token.
///
/// The token comes from `Authorization: Bearer`, falling back to the
/// `auth_token` cookie. On success the decoded `SessionClaims` are placed
/// in the request extensions.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let claims = {
        let token = session_token(request.headers())
            .ok_or_else(|| AppError::Unauthorized("missing session token".to_string()))?;
        state.auth.validate_session(token)?
    };

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

fn session_token(headers: &HeaderMap) -> Option<&str> {
    // A present Authorization header is authoritative, even when unreadable
    if let Some(authorization) = headers.get(header::AUTHORIZATION) {
        return extract_bearer(authorization.to_str().ok());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_token_from_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer a.b.c"));
        headers.insert(header::COOKIE, HeaderValue::from_static("auth_token=x.y.z"));
        assert_eq!(session_token(&headers), Some("a.b.c"));
    }

    #[test]
    fn test_malformed_header_does_not_fall_back_to_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic Zm9v"));
        headers.insert(header::COOKIE, HeaderValue::from_static("auth_token=x.y.z"));
        assert_eq!(session_token(&headers), None);
    }

    #[test]
    fn test_non_utf8_header_does_not_fall_back_to_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_bytes(b"Bearer \xff\xfe").unwrap(),
        );
        headers.insert(header::COOKIE, HeaderValue::from_static("auth_token=x.y.z"));
        assert_eq!(session_token(&headers), None);
    }

    #[test]
    fn test_token_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; auth_token=x.y.z; lang=he"),
        );
        assert_eq!(session_token(&headers), Some("x.y.z"));

        let mut empty = HeaderMap::new();
        empty.insert(header::COOKIE, HeaderValue::from_static("auth_token="));
        assert_eq!(session_token(&empty), None);
        assert_eq!(session_token(&HeaderMap::new()), None);
    }
}
