//! Access resolver
//!
//! Turns a session identity into the user's role names, access map and the
//! accounts and applications they may see. Resolution runs in a fixed order:
//!
//! 1. Role catalog
//! 2. The user's role assignments, folded into an [`AccessMap`]
//! 3. Role names; ids missing from the catalog are recorded and dropped
//! 4. Account and application catalogs
//! 5. Visibility filtering
//!
//! Any fetch failure aborts resolution. An empty or failed fetch never
//! widens access.

use crate::access_control::source::SharedAccessSource;
use crate::access_control::types::AccessMap;
use crate::api::{Account, Application, Role};
use crate::auth::SessionIdentity;
use crate::error::{ApiResult, IntegrityError};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, instrument, warn};

/// Everything derived for one request
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedAccess {
    /// Names of the roles the user holds
    pub role_names: BTreeSet<String>,
    /// Where each role applies
    pub access_map: AccessMap,
    /// Accounts the user may see, in catalog order
    pub visible_accounts: Vec<Account>,
    /// Applications the user may see, in catalog order
    pub visible_applications: Vec<Application>,
    /// Assignments skipped because their role is not in the catalog
    pub integrity_errors: Vec<IntegrityError>,
}

impl ResolvedAccess {
    /// Whether the user holds any of `permitted_roles`
    pub fn permits<S: AsRef<str>>(&self, permitted_roles: &[S]) -> bool {
        check_permission(&self.role_names, permitted_roles)
    }

    /// Ids of the visible applications
    pub fn visible_application_ids(&self) -> BTreeSet<u64> {
        self.visible_applications.iter().map(|a| a.appid).collect()
    }
}

/// Access resolver
///
/// Stateless apart from its source: every call to [`AccessResolver::resolve`]
/// fetches fresh data.
#[derive(Clone)]
pub struct AccessResolver {
    source: SharedAccessSource,
}

impl AccessResolver {
    pub fn new(source: SharedAccessSource) -> Self {
        Self { source }
    }

    /// Resolve access for an identity. Anonymous callers get empty results
    /// without any upstream call.
    #[instrument(skip(self, identity), fields(uid = ?identity.map(|i| i.uid)))]
    pub async fn resolve(&self, identity: Option<&SessionIdentity>) -> ApiResult<ResolvedAccess> {
        let Some(identity) = identity else {
            debug!("Anonymous request, nothing to resolve");
            return Ok(ResolvedAccess::default());
        };

        let catalog = self.source.role_catalog(identity).await?;
        let assignments = self.source.role_assignments(identity).await?;

        let mut access_map = AccessMap::from_assignments(&assignments);
        let (role_names, integrity_errors) = resolve_role_names(&mut access_map, &catalog);
        if access_map.is_empty() {
            debug!("User holds no usable role assignments");
        }

        let accounts = self.source.accounts(identity).await?;
        let applications = self.source.applications(identity).await?;

        let visible_applications = visible_applications(&access_map, &applications);
        let visible_accounts = visible_accounts(&access_map, &accounts, &visible_applications);

        debug!(
            roles = role_names.len(),
            accounts = visible_accounts.len(),
            applications = visible_applications.len(),
            skipped = integrity_errors.len(),
            "Resolved access"
        );

        Ok(ResolvedAccess {
            role_names,
            access_map,
            visible_accounts,
            visible_applications,
            integrity_errors,
        })
    }
}

/// Look every role id of the map up in the catalog.
///
/// Ids without a catalog entry are integrity errors: they are logged,
/// recorded, and revoked from the map so nothing downstream acts on them.
pub fn resolve_role_names(
    access_map: &mut AccessMap,
    catalog: &[Role],
) -> (BTreeSet<String>, Vec<IntegrityError>) {
    let names: HashMap<u64, &str> = catalog.iter().map(|r| (r.rid, r.name.as_str())).collect();

    let mut role_names = BTreeSet::new();
    let mut errors = Vec::new();

    for rid in access_map.role_ids() {
        match names.get(&rid) {
            Some(name) => {
                role_names.insert((*name).to_string());
            }
            None => {
                let error = IntegrityError { rid };
                warn!(rid, error = %error, "Skipping role assignment");
                errors.push(error);
            }
        }
    }

    for error in &errors {
        access_map.revoke_role(error.rid);
    }

    (role_names, errors)
}

/// Applications visible under `access_map`, in catalog order
pub fn visible_applications(access_map: &AccessMap, applications: &[Application]) -> Vec<Application> {
    if access_map.is_platform_wide() {
        return applications.to_vec();
    }

    applications
        .iter()
        .filter(|app| access_map.grants_application(app.appid, app.accid))
        .cloned()
        .collect()
}

/// Accounts named by `access_map` or owning a visible application, in
/// catalog order
pub fn visible_accounts(
    access_map: &AccessMap,
    accounts: &[Account],
    visible_applications: &[Application],
) -> Vec<Account> {
    if access_map.is_platform_wide() {
        return accounts.to_vec();
    }

    let via_applications: BTreeSet<u64> = visible_applications.iter().map(|a| a.accid).collect();

    accounts
        .iter()
        .filter(|acc| access_map.names_account(acc.accid) || via_applications.contains(&acc.accid))
        .cloned()
        .collect()
}

/// Page gate: true when the page is unrestricted or the user holds one of
/// its roles
pub fn check_permission<S: AsRef<str>>(role_names: &BTreeSet<String>, permitted_roles: &[S]) -> bool {
    permitted_roles.is_empty()
        || permitted_roles
            .iter()
            .any(|role| role_names.contains(role.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access_control::types::roles;
    use crate::api::RoleAssignment;

    fn role(rid: u64, name: &str) -> Role {
        Role {
            rid,
            name: name.to_string(),
        }
    }

    fn app(appid: u64, accid: u64) -> Application {
        Application {
            appid,
            accid,
            name: format!("app-{appid}"),
        }
    }

    fn account(accid: u64) -> Account {
        Account {
            accid,
            name: format!("acc-{accid}"),
        }
    }

    #[test]
    fn test_check_permission_unrestricted() {
        let empty: [&str; 0] = [];
        assert!(check_permission(&BTreeSet::new(), &empty));
    }

    #[test]
    fn test_check_permission_no_roles_denied() {
        assert!(!check_permission(&BTreeSet::new(), &[roles::ADMINISTRATOR]));
    }

    #[test]
    fn test_check_permission_intersection() {
        let held = BTreeSet::from([roles::DEVELOPER.to_string()]);
        assert!(check_permission(&held, &[roles::APPLICATION_MANAGER, roles::DEVELOPER]));
        assert!(!check_permission(&held, &[roles::ADMINISTRATOR]));
    }

    #[test]
    fn test_unknown_role_is_revoked() {
        let mut map = AccessMap::from_assignments(&[
            RoleAssignment::new(None, None, 99),
            RoleAssignment::new(Some(5), None, 3),
        ]);
        let (names, errors) = resolve_role_names(&mut map, &[role(3, roles::DEVELOPER)]);

        assert_eq!(names, BTreeSet::from([roles::DEVELOPER.to_string()]));
        assert_eq!(errors, vec![IntegrityError { rid: 99 }]);
        // The bad row must not leave a platform-wide grant behind
        assert!(!map.is_platform_wide());
    }

    #[test]
    fn test_account_wildcard_visibility() {
        let map = AccessMap::from_assignments(&[RoleAssignment::new(Some(5), None, 3)]);
        let apps = vec![app(1, 5), app(2, 9)];
        let visible = visible_applications(&map, &apps);
        assert_eq!(visible, vec![app(1, 5)]);

        let accounts = visible_accounts(&map, &[account(5), account(9)], &visible);
        assert_eq!(accounts, vec![account(5)]);
    }

    #[test]
    fn test_explicit_application_pulls_in_its_account() {
        let map = AccessMap::from_assignments(&[RoleAssignment::new(Some(9), Some(2), 3)]);
        let apps = vec![app(1, 5), app(2, 9), app(3, 9)];
        let visible = visible_applications(&map, &apps);
        assert_eq!(visible, vec![app(2, 9)]);

        let accounts = visible_accounts(&map, &[account(5), account(9)], &visible);
        assert_eq!(accounts, vec![account(9)]);
    }

    #[test]
    fn test_platform_wide_sees_everything() {
        let map = AccessMap::from_assignments(&[
            RoleAssignment::new(Some(5), Some(1), 3),
            RoleAssignment::new(None, None, 1),
        ]);
        let apps = vec![app(1, 5), app(2, 9)];
        let accounts = vec![account(5), account(9), account(11)];

        let visible = visible_applications(&map, &apps);
        assert_eq!(visible, apps);
        assert_eq!(visible_accounts(&map, &accounts, &visible), accounts);
    }
}
