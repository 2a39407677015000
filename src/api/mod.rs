//! Platform API module
//!
//! Provides a typed client for the admin endpoints of the platform REST API.

pub mod client;
pub mod types;

pub use client::ApiClient;
pub use types::*;
