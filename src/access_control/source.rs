//! Where access data comes from
//!
//! The resolver reads the role catalog, a user's assignments and the
//! account/application catalogs through [`AccessSource`]. [`ApiClient`] is
//! the production implementation.

use crate::api::{Account, ApiClient, Application, Role, RoleAssignment};
use crate::auth::SessionIdentity;
use crate::error::ApiResult;
// async_trait required for dyn-compatibility with Arc<dyn AccessSource>
use async_trait::async_trait;
use std::sync::Arc;

/// Source of the data access resolution is computed from
#[async_trait]
pub trait AccessSource: Send + Sync {
    /// Full role catalog
    async fn role_catalog(&self, identity: &SessionIdentity) -> ApiResult<Vec<Role>>;

    /// Roles assigned to the identity's user
    async fn role_assignments(&self, identity: &SessionIdentity)
    -> ApiResult<Vec<RoleAssignment>>;

    /// Every account, unscoped
    async fn accounts(&self, identity: &SessionIdentity) -> ApiResult<Vec<Account>>;

    /// Every application, unscoped
    async fn applications(&self, identity: &SessionIdentity) -> ApiResult<Vec<Application>>;
}

/// Shared handle to an access source
pub type SharedAccessSource = Arc<dyn AccessSource>;

#[async_trait]
impl AccessSource for ApiClient {
    async fn role_catalog(&self, identity: &SessionIdentity) -> ApiResult<Vec<Role>> {
        self.roles_all(identity).await
    }

    async fn role_assignments(
        &self,
        identity: &SessionIdentity,
    ) -> ApiResult<Vec<RoleAssignment>> {
        self.user_roles(identity, identity.uid).await
    }

    async fn accounts(&self, identity: &SessionIdentity) -> ApiResult<Vec<Account>> {
        ApiClient::accounts(self, identity, &[]).await
    }

    async fn applications(&self, identity: &SessionIdentity) -> ApiResult<Vec<Application>> {
        ApiClient::applications(self, identity, &[]).await
    }
}
