//! Per-request access
//!
//! A page handler creates one [`RequestAccess`] per inbound request. The
//! first call that needs access data triggers resolution; later calls in the
//! same request reuse it. Nothing outlives the request.

use crate::access_control::menu::build_menu;
use crate::access_control::resolver::{AccessResolver, ResolvedAccess};
use crate::access_control::types::MenuItem;
use crate::auth::SessionIdentity;
use crate::error::ApiResult;
use crate::gate::{GateDecision, Page, gate};
use tokio::sync::OnceCell;

/// Lazily resolved access for a single request
pub struct RequestAccess {
    resolver: AccessResolver,
    identity: Option<SessionIdentity>,
    resolved: OnceCell<ResolvedAccess>,
}

impl RequestAccess {
    pub fn new(resolver: AccessResolver, identity: Option<SessionIdentity>) -> Self {
        Self {
            resolver,
            identity,
            resolved: OnceCell::new(),
        }
    }

    pub fn identity(&self) -> Option<&SessionIdentity> {
        self.identity.as_ref()
    }

    /// Resolve on first use. A failed resolution is not cached.
    pub async fn resolved(&self) -> ApiResult<&ResolvedAccess> {
        self.resolved
            .get_or_try_init(|| self.resolver.resolve(self.identity.as_ref()))
            .await
    }

    /// Apply the page gate for `page`
    pub async fn gate(&self, page: Page) -> GateDecision {
        gate(page, self.resolved().await)
    }

    /// Menu for this request
    pub async fn menu(&self) -> ApiResult<Vec<MenuItem>> {
        let resolved = self.resolved().await?;
        Ok(build_menu(self.identity.as_ref(), &resolved.role_names))
    }
}
