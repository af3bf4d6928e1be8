// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for Prometheus metric keys
pub const LOGIN_SUCCESS: &str = "auth.login.success";
pub const LOGIN_FAILURE: &str = "auth.login.failure";
pub const DIRECTORY_ERROR: &str = "auth.directory.error";
pub const TOKEN_ISSUED: &str = "session.token.issued";
pub const TOKEN_REJECTED: &str = "session.token.rejected";
