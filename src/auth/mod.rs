//! Authentication module
//!
//! Carries the caller's session identity to the API client. Token issuance
//! and validation belong to the remote API; this crate only forwards the
//! bearer token and reacts to 401 responses.

pub mod session;

pub use session::{AUTHORIZATION, SessionIdentity};
