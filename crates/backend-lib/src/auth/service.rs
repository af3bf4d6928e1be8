use async_trait::async_trait;
use portal_common::SessionClaims;

use super::TokenError;
use crate::directory::CredentialDirectory;
use crate::error::AuthFailure;

/// Login and re-authentication entry points used by the HTTP layer.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Check `password` for `identifier` and mint a session token on success.
    async fn authenticate(
        &self,
        identifier: &str,
        password: &str,
        directory: &dyn CredentialDirectory,
    ) -> Result<String, AuthFailure>;

    /// Validate a token presented on a later request.
    fn validate_session(&self, token: &str) -> Result<SessionClaims, TokenError>;
}
