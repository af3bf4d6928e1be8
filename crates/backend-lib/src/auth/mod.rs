// ============================
// portal-auth/src/auth/mod.rs
// ============================
//! Authentication module.

pub mod gateway;
pub mod password;
pub mod secret;
pub mod session;
mod service;

pub use gateway::AuthenticationGateway;
pub use password::{hash_password, hash_with_salt, verify_password, HashError, DEFAULT_STRENGTH};
pub use secret::SharedSecret;
pub use session::{
    extract_bearer, Clock, FixedClock, SessionTokenCodec, SystemClock, TokenError, SESSION_TTL,
};
pub use service::AuthService;
