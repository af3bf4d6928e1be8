// crates/backend-lib/src/middleware/mod.rs

//! Middleware for the portal HTTP surface.

pub mod session;

pub use session::require_session;
