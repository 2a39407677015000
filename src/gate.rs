//! Page gate
//!
//! Every admin page runs the gate before doing anything else. The gate maps
//! the outcome of access resolution to either "go ahead" or a redirect:
//!
//! | Outcome | Redirect | Session |
//! |---|---|---|
//! | HTTP 401 from the API | `/login` | cleared |
//! | any other API failure | `/` with the error | kept |
//! | no permitted role | `/` with "access denied" | kept |
//!
//! An unrestricted page that hits an API failure renders degraded (no roles,
//! no visible entities, error shown) instead of redirecting to itself. A
//! failed resolution never falls back to broader access.

use crate::access_control::ResolvedAccess;
use crate::access_control::types::roles;
use crate::error::ApiError;
use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

/// Admin pages and the roles allowed on them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Home,
    MyAccount,
    Accounts,
    Applications,
    Users,
    Invites,
    UserRoles,
    Roles,
    Resources,
    Vars,
}

const MANAGERS: &[&str] = &[
    roles::ADMINISTRATOR,
    roles::ACCOUNT_MANAGER,
    roles::APPLICATION_MANAGER,
];

const CATALOG_VIEWERS: &[&str] = &[
    roles::ADMINISTRATOR,
    roles::ACCOUNT_MANAGER,
    roles::APPLICATION_MANAGER,
    roles::DEVELOPER,
];

impl Page {
    /// Roles allowed to visit the page; empty means unrestricted
    pub const fn permitted_roles(&self) -> &'static [&'static str] {
        match self {
            Page::Home | Page::MyAccount => &[],
            Page::Accounts | Page::Applications => CATALOG_VIEWERS,
            Page::Users | Page::Invites | Page::UserRoles => MANAGERS,
            Page::Roles => &[roles::ADMINISTRATOR, roles::ACCOUNT_MANAGER],
            Page::Resources => &[roles::DEVELOPER],
            Page::Vars => &[roles::APPLICATION_MANAGER, roles::DEVELOPER],
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::MyAccount => "my account",
            Page::Accounts => "accounts",
            Page::Applications => "applications",
            Page::Users => "users",
            Page::Invites => "invites",
            Page::UserRoles => "user roles",
            Page::Roles => "roles",
            Page::Resources => "resources",
            Page::Vars => "vars",
        }
    }

    /// Try to parse a page from its name
    pub fn try_parse(s: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|page| page.as_str().eq_ignore_ascii_case(s.trim()))
    }

    pub fn all() -> &'static [Page] {
        &[
            Page::Home,
            Page::MyAccount,
            Page::Accounts,
            Page::Applications,
            Page::Users,
            Page::Invites,
            Page::UserRoles,
            Page::Roles,
            Page::Resources,
            Page::Vars,
        ]
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One-shot error message shown on the next rendered page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlashMessage {
    pub text: String,
}

impl FlashMessage {
    pub fn error(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Where to send the user instead of the requested page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub location: &'static str,
    pub flash: FlashMessage,
    /// Drop the session identity before redirecting
    pub clear_session: bool,
}

/// Outcome of the page gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GateDecision {
    Granted,
    /// Render the unrestricted page as an anonymous-like view with an error
    Degraded(FlashMessage),
    Redirect(Redirect),
}

impl GateDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, GateDecision::Granted)
    }
}

/// Decide whether the request may proceed to `page`
pub fn gate(page: Page, outcome: Result<&ResolvedAccess, ApiError>) -> GateDecision {
    match outcome {
        Ok(access) if access.permits(page.permitted_roles()) => {
            debug!(page = %page, "Access granted");
            GateDecision::Granted
        }
        Ok(_) => {
            debug!(page = %page, "Access denied by role");
            GateDecision::Redirect(Redirect {
                location: HOME_PATH,
                flash: FlashMessage::error(format!("Access {}: access denied", page)),
                clear_session: false,
            })
        }
        Err(e) if e.is_auth() => {
            warn!(page = %page, "Session rejected by API, forcing login");
            GateDecision::Redirect(Redirect {
                location: LOGIN_PATH,
                flash: FlashMessage::error(e.to_string()),
                clear_session: true,
            })
        }
        Err(e) if page.permitted_roles().is_empty() => {
            warn!(page = %page, error = %e, "Access resolution failed, rendering degraded");
            GateDecision::Degraded(FlashMessage::error(e.to_string()))
        }
        Err(e) => {
            warn!(page = %page, error = %e, "Access resolution failed");
            GateDecision::Redirect(Redirect {
                location: HOME_PATH,
                flash: FlashMessage::error(e.to_string()),
                clear_session: false,
            })
        }
    }
}
