// ============================
// portal-auth/src/config.rs
// ============================
//! Configuration management.
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::SharedSecret;


/// Development-only signing secret. Must be overridden in production.
pub const DEFAULT_JWT_SECRET: &str = "insecure-dev-secret-change-me";

/// Default config file, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "portal.toml";

/// Prefix for environment overrides, e.g. `PORTAL_JWT_SECRET`
pub const ENV_PREFIX: &str = "PORTAL_";

const SECRET_KEY: &str = "jwt_secret";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),

    #[error("jwt_secret must not be empty")]
    EmptySecret,
}

/// Application settings
#[derive(Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Log level
    pub log_level: String,
    /// Token signing secret
    pub jwt_secret: String,
    /// JSON file exported from the partner platform's user table
    pub directory_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            log_level: "info".to_string(),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            directory_path: PathBuf::from("data/credentials.json"),
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("jwt_secret", &"**redacted**")
            .field("directory_path", &self.directory_path)
            .finish()
    }
}

impl Settings {
    /// Load from `portal.toml` and `PORTAL_*` environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Defaults, then the TOML file at `path` (if present), then environment.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).ignore(&[SECRET_KEY]));

        // The secret is opaque: keep `PORTAL_JWT_SECRET=1234` a string instead
        // of letting figment parse it into a number or bool.
        if let Some((_, secret)) = Env::prefixed(ENV_PREFIX).only(&[SECRET_KEY]).iter().last() {
            figment = figment.merge(Serialized::default(SECRET_KEY, secret));
        }

        let settings: Settings = figment.extract().map_err(Box::new)?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.log_level.clone()));
        }
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        Ok(())
    }

    /// True while the insecure development secret is in use
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }

    pub fn shared_secret(&self) -> SharedSecret {
        SharedSecret::from(self.jwt_secret.as_str())
    }
}
