// ============================
// portal-auth/src/lib.rs
// ============================
//! Credential verification and session tokens for the driver/admin portal.
//!
//! The core is [`auth`]: legacy portable-hash verification, signed session
//! tokens and the login gateway that ties them to a [`directory`]. The
//! [`router`], [`handlers`] and [`middleware`] modules put a thin HTTP layer
//! on top.

pub mod auth;
pub mod config;
pub mod directory;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod router;

use std::sync::Arc;

use crate::auth::{AuthService, AuthenticationGateway, SessionTokenCodec};
use crate::config::Settings;
use crate::directory::{CredentialDirectory, FlatFileDirectory};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth: Arc<dyn AuthService>,
    /// User directory consulted on login
    pub directory: Arc<dyn CredentialDirectory>,
    /// Loaded settings
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Create a new application state around `directory`
    pub fn new(directory: Arc<dyn CredentialDirectory>, settings: Settings) -> Self {
        let codec = SessionTokenCodec::new(settings.shared_secret());
        Self::with_auth(Arc::new(AuthenticationGateway::new(codec)), directory, settings)
    }

    /// Create a state with a preconfigured auth service (e.g. a fixed clock)
    pub fn with_auth(
        auth: Arc<dyn AuthService>,
        directory: Arc<dyn CredentialDirectory>,
        settings: Settings,
    ) -> Self {
        Self {
            auth,
            directory,
            settings: Arc::new(settings),
        }
    }

    /// Create a state backed by the flat-file directory named in `settings`
    pub fn from_settings(settings: Settings) -> Self {
        let directory = Arc::new(FlatFileDirectory::new(&settings.directory_path));
        Self::new(directory, settings)
    }
}
