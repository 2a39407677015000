//! Access control module
//!
//! Derives what a logged-in user may see and do in the admin console from
//! the role assignments held by the remote API.
//!
//! ## Access Model
//!
//! Every assignment is a triple `(account, application, role)`. A missing
//! account or application id means "all" at that level. Assignments fold into
//! an [`AccessMap`]:
//!
//! ```text
//! account scope -> application scope -> { role ids }
//! ```
//!
//! Visibility follows from the map:
//! - `(*, *)` sees every account and application
//! - `(acc, *)` sees every application of `acc`
//! - `(acc, app)` sees `app`, and `acc` through it
//!
//! Role names gate pages (see [`crate::gate`]) and drive the menu
//! ([`build_menu`]). Resolution happens at most once per request through
//! [`RequestAccess`].

pub mod menu;
pub mod request;
pub mod resolver;
pub mod source;
pub mod types;

pub use menu::build_menu;
pub use request::RequestAccess;
pub use resolver::{AccessResolver, ResolvedAccess, check_permission};
pub use source::{AccessSource, SharedAccessSource};
pub use types::{AccessMap, ApplicationGrants, MenuItem, Scope, roles};
