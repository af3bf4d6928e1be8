// ============================
// portal-auth/src/auth/gateway.rs
// ============================
//! Login orchestration: directory lookup, hash check, token issue.
use async_trait::async_trait;
use portal_common::SessionClaims;
use tracing::{info, warn};
use zeroize::Zeroizing;

use super::{verify_password, AuthService, SessionTokenCodec, TokenError};
use crate::directory::CredentialDirectory;
use crate::error::AuthFailure;
use crate::metrics as keys;

/// Stateless login gateway. The only thing it holds is the token codec.
#[derive(Clone, Debug)]
pub struct AuthenticationGateway {
    codec: SessionTokenCodec,
}

impl AuthenticationGateway {
    pub fn new(codec: SessionTokenCodec) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &SessionTokenCodec {
        &self.codec
    }

    fn reject(identifier: &str) -> AuthFailure {
        ::metrics::counter!(keys::LOGIN_FAILURE).increment(1);
        info!(identifier, "login rejected");
        AuthFailure::InvalidCredentials
    }
}

#[async_trait]
impl AuthService for AuthenticationGateway {
    async fn authenticate(
        &self,
        identifier: &str,
        password: &str,
        directory: &dyn CredentialDirectory,
    ) -> Result<String, AuthFailure> {
        let record = match directory.find(identifier).await {
            Ok(Some(record)) => record,
            Ok(None) => return Err(Self::reject(identifier)),
            Err(e) => {
                ::metrics::counter!(keys::DIRECTORY_ERROR).increment(1);
                warn!(identifier, error = %e, "credential lookup failed");
                return Err(AuthFailure::DirectoryUnavailable(e));
            }
        };

        // Iteration cost comes from the stored hash, up to 2^30 rounds
        let password = Zeroizing::new(password.to_string());
        let stored_hash = record.stored_hash.clone();
        let verified = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "password verification task failed");
                false
            });
        if !verified {
            return Err(Self::reject(identifier));
        }

        let token = self.codec.issue(record.user_id, identifier)?;
        ::metrics::counter!(keys::LOGIN_SUCCESS).increment(1);
        info!(identifier, user_id = record.user_id, "login succeeded");
        Ok(token)
    }

    fn validate_session(&self, token: &str) -> Result<SessionClaims, TokenError> {
        self.codec.validate(token)
    }
}
