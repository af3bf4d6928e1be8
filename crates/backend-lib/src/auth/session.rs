// ============================
// portal-auth/src/auth/session.rs
// ============================
//! Stateless session tokens.
//!
//! Tokens are compact HS256 JWTs: `base64url(header).base64url(payload).
//! base64url(hmac)`. Nothing is stored server-side; a token is valid until
//! its `exp` passes.
use std::{sync::Arc, time::Duration};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use portal_common::{SessionClaims, UserId};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use tracing::debug;

use super::SharedSecret;
use crate::metrics as keys;

type HmacSha256 = Hmac<Sha256>;

/// Session TTL (time to live)
pub const SESSION_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 7); // 7 days

/// Only algorithm issued or accepted
const ALGORITHM: &str = "HS256";

/// Why a token was refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,

    #[error("unsupported token algorithm")]
    UnsupportedAlgorithm,

    #[error("token signature does not verify")]
    BadSignature,

    #[error("token expired")]
    Expired,

    #[error("failed to encode token: {0}")]
    Encoding(String),
}

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant, for tests and replay tooling
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Serialize, Deserialize)]
struct TokenHeader {
    alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,
}

/// Issues and checks session tokens
#[derive(Clone)]
pub struct SessionTokenCodec {
    secret: SharedSecret,
    clock: Arc<dyn Clock>,
}

impl SessionTokenCodec {
    /// Codec on the system clock
    pub fn new(secret: SharedSecret) -> Self {
        Self::with_clock(secret, Arc::new(SystemClock))
    }

    pub fn with_clock(secret: SharedSecret, clock: Arc<dyn Clock>) -> Self {
        Self { secret, clock }
    }

    /// Mint a token for `user_id` that expires [`SESSION_TTL`] from now.
    pub fn issue(&self, user_id: UserId, username: &str) -> Result<String, TokenError> {
        let claims = SessionClaims {
            user_id,
            username: username.to_string(),
            exp: self.clock.now().timestamp() + SESSION_TTL.as_secs() as i64,
        };
        let header = TokenHeader {
            alg: ALGORITHM.to_string(),
            typ: Some("JWT".to_string()),
        };

        let mut token = encode_segment(&header)?;
        token.push('.');
        token.push_str(&encode_segment(&claims)?);

        let signature = self.mac()?.chain_update(token.as_bytes()).finalize().into_bytes();
        token.push('.');
        token.push_str(&URL_SAFE_NO_PAD.encode(signature));

        ::metrics::counter!(keys::TOKEN_ISSUED).increment(1);
        debug!(user_id, "issued session token");
        Ok(token)
    }

    /// Check signature, structure and expiry, returning the payload.
    pub fn validate(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let result = self.check(token);
        if let Err(ref err) = result {
            ::metrics::counter!(keys::TOKEN_REJECTED).increment(1);
            debug!(reason = %err, "rejected session token");
        }
        result
    }

    fn check(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let mut parts = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed);
        };

        let parsed: TokenHeader = decode_segment(header)?;
        if parsed.alg != ALGORITHM {
            return Err(TokenError::UnsupportedAlgorithm);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::Malformed)?;
        let signing_input = &token[..header.len() + 1 + payload.len()];
        self.mac()?
            .chain_update(signing_input.as_bytes())
            .verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let claims: SessionClaims = decode_segment(payload)?;
        if claims.exp <= self.clock.now().timestamp() {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(self.secret.expose())
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }
}

impl std::fmt::Debug for SessionTokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokenCodec")
            .field("secret", &self.secret)
            .finish_non_exhaustive()
    }
}

fn encode_segment<T: Serialize>(value: &T) -> Result<String, TokenError> {
    let json = serde_json::to_vec(value).map_err(|e| TokenError::Encoding(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

fn decode_segment<T: DeserializeOwned>(segment: &str) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)
}

/// Pull the token out of an `Authorization: Bearer <token>` value.
///
/// The scheme is matched case-insensitively. Anything else, including an
/// empty token, yields `None`.
pub fn extract_bearer(header_value: Option<&str>) -> Option<&str> {
    let value = header_value?;
    let scheme = value.get(..6)?;
    let rest = value.get(6..)?;
    if !scheme.eq_ignore_ascii_case("bearer") || !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let token = rest.trim();
    if token.is_empty() || token.contains(char::is_whitespace) {
        return None;
    }
    Some(token)
}
