//! Studio admin access layer
//!
//! Access resolution for the administration console of an API-building
//! platform. The console holds no data of its own: roles, accounts,
//! applications and vars all come from the platform's remote API, called
//! with the logged-in user's bearer token.
//!
//! ## Features
//!
//! - **Role-scoped visibility** derived from `(account, application, role)`
//!   assignments, with wildcards at both levels
//! - **Page gating** with distinct outcomes for expired sessions and
//!   upstream failures
//! - **Menu construction** from the roles a user holds
//! - **Listing helpers** for pagination, stable sorting and var scoping
//! - **Flexible configuration** via TOML files and environment variables
//!
//! ## Access Model
//!
//! ```text
//! assignments -> access map -> role names -> visible accounts / applications
//! ```
//!
//! An access map entry `(*, *)` is platform-wide; `(acc, *)` covers every
//! application of one account; `(acc, app)` covers a single application.
//!
//! ## Example Configuration
//!
//! ```toml
//! [api]
//! url = "https://api.example.com"
//! core_account = "apiopenstudio"
//! core_application = "core"
//!
//! [admin]
//! pagination_step = 20
//! ```

pub mod access_control;
pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod gate;
pub mod listing;
pub mod util;
pub mod vars;

// Re-export main types
pub use access_control::{AccessResolver, RequestAccess, ResolvedAccess};
pub use api::ApiClient;
pub use auth::SessionIdentity;
pub use config::{AppConfig, load_config};
pub use error::{ApiError, ApiResult};
pub use gate::{GateDecision, Page, gate};
