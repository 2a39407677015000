//! Access control types
//!
//! Core types used by access resolution.

use crate::api::RoleAssignment;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Role names the admin pages and menu know about
pub mod roles {
    pub const ADMINISTRATOR: &str = "Administrator";
    pub const ACCOUNT_MANAGER: &str = "Account manager";
    pub const APPLICATION_MANAGER: &str = "Application manager";
    pub const DEVELOPER: &str = "Developer";
}

/// Account or application scope of a role grant.
///
/// `All` is the wildcard a null id stands for on the wire. It is a distinct
/// variant so that an entity whose id happens to be `0` is never mistaken
/// for "everything".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    All,
    Id(u64),
}

impl From<Option<u64>> for Scope {
    fn from(id: Option<u64>) -> Self {
        id.map_or(Scope::All, Scope::Id)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::All => f.write_str("*"),
            Scope::Id(id) => write!(f, "{}", id),
        }
    }
}

impl Serialize for Scope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Role ids granted per application, within one account scope
pub type ApplicationGrants = BTreeMap<Scope, BTreeSet<u64>>;

/// Which roles a user holds, and where.
///
/// `account scope -> application scope -> role ids`. Ordered maps keep
/// iteration, and everything derived from it, deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AccessMap(BTreeMap<Scope, ApplicationGrants>);

impl AccessMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold role assignments into a map. Duplicates collapse.
    pub fn from_assignments<'a, I>(assignments: I) -> Self
    where
        I: IntoIterator<Item = &'a RoleAssignment>,
    {
        let mut map = Self::new();
        for assignment in assignments {
            map.grant(assignment.accid.into(), assignment.appid.into(), assignment.rid);
        }
        map
    }

    /// Record that `rid` applies to `application` within `account`
    pub fn grant(&mut self, account: Scope, application: Scope, rid: u64) {
        self.0
            .entry(account)
            .or_default()
            .entry(application)
            .or_default()
            .insert(rid);
    }

    /// Remove every grant of `rid`, dropping cells left empty
    pub fn revoke_role(&mut self, rid: u64) {
        for apps in self.0.values_mut() {
            for rids in apps.values_mut() {
                rids.remove(&rid);
            }
            apps.retain(|_, rids| !rids.is_empty());
        }
        self.0.retain(|_, apps| !apps.is_empty());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether some role applies to every account
    pub fn is_platform_wide(&self) -> bool {
        self.0.contains_key(&Scope::All)
    }

    /// Every role id reachable anywhere in the map
    pub fn role_ids(&self) -> BTreeSet<u64> {
        self.0
            .values()
            .flat_map(|apps| apps.values())
            .flatten()
            .copied()
            .collect()
    }

    /// Whether the map references this account by id
    pub fn names_account(&self, accid: u64) -> bool {
        self.0.contains_key(&Scope::Id(accid))
    }

    /// Whether an application is visible under this map.
    ///
    /// True when some role is platform-wide, covers every application of
    /// the application's account, or names the application explicitly.
    pub fn grants_application(&self, appid: u64, accid: u64) -> bool {
        self.0.iter().any(|(account, apps)| match account {
            Scope::All => true,
            Scope::Id(id) => {
                (*id == accid && apps.contains_key(&Scope::All))
                    || apps.contains_key(&Scope::Id(appid))
            }
        })
    }
}

/// One navigation entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub label: String,
    pub path: String,
}

impl MenuItem {
    pub fn new(label: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_from_option() {
        assert_eq!(Scope::from(None), Scope::All);
        assert_eq!(Scope::from(Some(0)), Scope::Id(0));
        assert_ne!(Scope::from(Some(0)), Scope::All);
    }

    #[test]
    fn test_fold_deduplicates() {
        let assignments = vec![
            RoleAssignment::new(Some(5), None, 3),
            RoleAssignment::new(Some(5), None, 3),
            RoleAssignment::new(Some(5), Some(1), 4),
        ];
        let map = AccessMap::from_assignments(&assignments);

        assert_eq!(
            serde_json::to_value(&map).unwrap(),
            serde_json::json!({"5": {"*": [3], "1": [4]}})
        );
        assert_eq!(map.role_ids(), BTreeSet::from([3, 4]));
    }

    #[test]
    fn test_platform_wide() {
        let map = AccessMap::from_assignments(&[RoleAssignment::new(None, None, 1)]);
        assert!(map.is_platform_wide());
        assert!(map.grants_application(42, 7));

        let map = AccessMap::from_assignments(&[RoleAssignment::new(Some(0), None, 1)]);
        assert!(!map.is_platform_wide());
        assert!(!map.grants_application(42, 7));
    }

    #[test]
    fn test_grants_application() {
        let map = AccessMap::from_assignments(&[
            RoleAssignment::new(Some(5), None, 3),
            RoleAssignment::new(Some(9), Some(2), 3),
        ]);
        assert!(map.grants_application(1, 5));
        assert!(map.grants_application(2, 9));
        assert!(!map.grants_application(3, 9));
    }

    #[test]
    fn test_revoke_role_prunes_empty_cells() {
        let mut map = AccessMap::from_assignments(&[
            RoleAssignment::new(Some(5), None, 99),
            RoleAssignment::new(Some(9), Some(2), 3),
        ]);
        map.revoke_role(99);
        assert!(!map.names_account(5));
        assert!(map.names_account(9));
        assert_eq!(map.role_ids(), BTreeSet::from([3]));
    }

    #[test]
    fn test_serialize_uses_wildcard_key() {
        let map = AccessMap::from_assignments(&[RoleAssignment::new(None, Some(2), 1)]);
        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json, serde_json::json!({"*": {"2": [1]}}));
    }
}
