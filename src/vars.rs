//! Variable store scoping
//!
//! The var store API filters by application, keyword and a few sort keys.
//! Everything that depends on the user's access (visibility, the account
//! filter, sorting by account or application name) happens here, against
//! the [`ResolvedAccess`] of the request.

use crate::access_control::ResolvedAccess;
use crate::api::Var;
use crate::error::ValidationError;
use crate::listing::{SortDirection, sort_stable_by_key};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Requested ordering of the var listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VarSort {
    /// Account name, then application name; sorted locally
    Account,
    /// Application name; sorted locally
    Application,
    /// Any other key, passed through to the API
    Remote(String),
}

impl VarSort {
    pub fn parse(s: &str) -> Self {
        match s {
            "account" => VarSort::Account,
            "application" => VarSort::Application,
            other => VarSort::Remote(other.to_string()),
        }
    }
}

/// Filters of the var listing page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VarFilter {
    pub filter_by_account: Option<u64>,
    pub filter_by_application: Option<u64>,
    pub keyword: Option<String>,
    pub order_by: Option<VarSort>,
    pub direction: Option<SortDirection>,
}

impl VarFilter {
    /// Parse filters from request parameters.
    ///
    /// An application filter clears the account filter.
    pub fn from_query<K, V, I>(pairs: I) -> Result<Self, ValidationError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut filter = VarFilter::default();

        for (key, value) in pairs {
            let value = value.as_ref().trim();
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "filter_by_account" => filter.filter_by_account = Some(parse_id("filter_by_account", value)?),
                "filter_by_application" => {
                    filter.filter_by_application = Some(parse_id("filter_by_application", value)?)
                }
                "keyword" => filter.keyword = Some(value.to_string()),
                "order_by" => filter.order_by = Some(VarSort::parse(value)),
                "direction" => filter.direction = Some(value.parse()?),
                _ => {}
            }
        }

        Ok(filter.normalized())
    }

    /// Drop the account filter when an application filter is present
    pub fn normalized(mut self) -> Self {
        if self.filter_by_application.is_some() {
            self.filter_by_account = None;
        }
        self
    }

    /// Query parameters understood by `GET var_store`
    pub fn api_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(appid) = self.filter_by_application {
            query.push(("appid", appid.to_string()));
        }
        if let Some(keyword) = &self.keyword {
            query.push(("keyword", keyword.clone()));
        }
        // Account and application sorts run locally, direction with them
        if let Some(VarSort::Remote(key)) = &self.order_by {
            query.push(("order_by", key.clone()));
            if let Some(direction) = self.direction {
                query.push(("direction", direction.as_str().to_string()));
            }
        }
        query
    }
}

fn parse_id(param: &str, value: &str) -> Result<u64, ValidationError> {
    value
        .parse()
        .map_err(|_| ValidationError::invalid(param, value))
}

/// Restrict `vars` to what `access` may see and apply the local filters
/// and sorts of `filter`.
pub fn scope_vars(vars: Vec<Var>, access: &ResolvedAccess, filter: &VarFilter) -> Vec<Var> {
    let applications: HashMap<u64, (u64, &str)> = access
        .visible_applications
        .iter()
        .map(|app| (app.appid, (app.accid, app.name.as_str())))
        .collect();
    let accounts: HashMap<u64, &str> = access
        .visible_accounts
        .iter()
        .map(|acc| (acc.accid, acc.name.as_str()))
        .collect();

    let received = vars.len();
    let account_filter = match filter.filter_by_application {
        Some(_) => None,
        None => filter.filter_by_account,
    };

    let mut scoped: Vec<Var> = vars
        .into_iter()
        .filter(|var| match applications.get(&var.appid) {
            None => false,
            Some((accid, _)) => {
                filter.filter_by_application.is_none_or(|appid| appid == var.appid)
                    && account_filter.is_none_or(|wanted| wanted == *accid)
            }
        })
        .collect();

    let direction = filter.direction.unwrap_or_default();
    let app_name = |var: &Var| applications.get(&var.appid).map(|(_, name)| *name);
    match filter.order_by {
        Some(VarSort::Account) => sort_stable_by_key(&mut scoped, direction, |var| {
            let account = applications
                .get(&var.appid)
                .and_then(|(accid, _)| accounts.get(accid).copied());
            (account, app_name(var))
        }),
        Some(VarSort::Application) => sort_stable_by_key(&mut scoped, direction, app_name),
        _ => {}
    }

    debug!(received, kept = scoped.len(), "Scoped vars");
    scoped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Account, Application};
    use serde_json::json;

    fn var(vid: u64, appid: u64) -> Var {
        Var {
            vid,
            appid,
            key: format!("key{vid}"),
            val: json!(vid),
        }
    }

    fn access() -> ResolvedAccess {
        ResolvedAccess {
            visible_accounts: vec![
                Account {
                    accid: 1,
                    name: "zeta".into(),
                },
                Account {
                    accid: 2,
                    name: "alpha".into(),
                },
            ],
            visible_applications: vec![
                Application {
                    appid: 10,
                    accid: 1,
                    name: "billing".into(),
                },
                Application {
                    appid: 20,
                    accid: 2,
                    name: "crm".into(),
                },
                Application {
                    appid: 21,
                    accid: 2,
                    name: "analytics".into(),
                },
            ],
            ..Default::default()
        }
    }

    fn vids(vars: &[Var]) -> Vec<u64> {
        vars.iter().map(|v| v.vid).collect()
    }

    #[test]
    fn test_invisible_applications_dropped() {
        let vars = vec![var(1, 10), var(2, 99), var(3, 20)];
        let scoped = scope_vars(vars, &access(), &VarFilter::default());
        assert_eq!(vids(&scoped), vec![1, 3]);
    }

    #[test]
    fn test_no_visible_applications_means_no_vars() {
        let vars = vec![var(1, 10), var(2, 20)];
        let scoped = scope_vars(vars, &ResolvedAccess::default(), &VarFilter::default());
        assert!(scoped.is_empty());
    }

    #[test]
    fn test_account_filter() {
        let filter = VarFilter {
            filter_by_account: Some(2),
            ..Default::default()
        };
        let scoped = scope_vars(vec![var(1, 10), var(2, 20), var(3, 21)], &access(), &filter);
        assert_eq!(vids(&scoped), vec![2, 3]);
    }

    #[test]
    fn test_application_filter_wins_over_account() {
        let filter = VarFilter {
            filter_by_account: Some(1),
            filter_by_application: Some(21),
            ..Default::default()
        };
        let scoped = scope_vars(vec![var(1, 10), var(2, 20), var(3, 21)], &access(), &filter);
        assert_eq!(vids(&scoped), vec![3]);
    }

    #[test]
    fn test_sort_by_account_then_application() {
        let filter = VarFilter {
            order_by: Some(VarSort::Account),
            ..Default::default()
        };
        let vars = vec![var(1, 10), var(2, 20), var(3, 21), var(4, 20)];
        let scoped = scope_vars(vars, &access(), &filter);
        // alpha/analytics, alpha/crm (stable), zeta/billing
        assert_eq!(vids(&scoped), vec![3, 2, 4, 1]);
    }

    #[test]
    fn test_sort_by_application_desc() {
        let filter = VarFilter {
            order_by: Some(VarSort::Application),
            direction: Some(SortDirection::Desc),
            ..Default::default()
        };
        let scoped = scope_vars(vec![var(1, 10), var(2, 21), var(3, 20)], &access(), &filter);
        assert_eq!(vids(&scoped), vec![3, 1, 2]);
    }

    #[test]
    fn test_remote_sort_keeps_api_order() {
        let filter = VarFilter {
            order_by: Some(VarSort::Remote("key".into())),
            ..Default::default()
        };
        let scoped = scope_vars(vec![var(3, 20), var(1, 10), var(2, 21)], &access(), &filter);
        assert_eq!(vids(&scoped), vec![3, 1, 2]);
    }

    #[test]
    fn test_from_query_and_api_query() {
        let filter = VarFilter::from_query([
            ("filter_by_account", "1"),
            ("filter_by_application", "21"),
            ("keyword", "db"),
            ("order_by", "key"),
            ("direction", "desc"),
            ("page", "2"),
        ])
        .unwrap();

        assert_eq!(filter.filter_by_account, None);
        assert_eq!(
            filter.api_query(),
            vec![
                ("appid", "21".to_string()),
                ("keyword", "db".to_string()),
                ("order_by", "key".to_string()),
                ("direction", "desc".to_string()),
            ]
        );
    }

    #[test]
    fn test_local_sorts_not_sent_upstream() {
        for key in ["account", "application"] {
            let filter = VarFilter::from_query([("order_by", key), ("direction", "desc")]).unwrap();
            assert_eq!(filter.direction, Some(SortDirection::Desc));
            assert!(filter.api_query().is_empty());
        }
    }

    #[test]
    fn test_direction_without_sort_key_stays_local() {
        let filter = VarFilter::from_query([("direction", "asc")]).unwrap();
        assert!(filter.api_query().is_empty());
    }

    #[test]
    fn test_from_query_rejects_bad_id() {
        let err = VarFilter::from_query([("filter_by_account", "abc")]).unwrap_err();
        assert_eq!(err, ValidationError::invalid("filter_by_account", "abc"));
    }
}
