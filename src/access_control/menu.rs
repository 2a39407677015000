//! Navigation menu
//!
//! Rules are applied top to bottom and are additive. A path appears once,
//! at the position of the first rule that adds it.

use crate::access_control::types::{MenuItem, roles};
use crate::auth::SessionIdentity;
use std::collections::{BTreeSet, HashSet};

const ADMIN_ENTRIES: &[(&str, &str)] = &[
    ("Accounts", "/accounts"),
    ("Applications", "/applications"),
    ("Users", "/users"),
    ("Invites", "/invites"),
    ("User Roles", "/user/roles"),
    ("Roles", "/roles"),
];

const APPLICATION_MANAGER_ENTRIES: &[(&str, &str)] = &[
    ("Accounts", "/accounts"),
    ("Applications", "/applications"),
    ("Users", "/users"),
    ("Invites", "/invites"),
    ("User Roles", "/user/roles"),
];

const DEVELOPER_ENTRIES: &[(&str, &str)] = &[
    ("Accounts", "/accounts"),
    ("Applications", "/applications"),
    ("Resources", "/resources"),
    ("Vars", "/vars"),
];

#[derive(Default)]
struct MenuBuilder {
    items: Vec<MenuItem>,
    seen: HashSet<String>,
}

impl MenuBuilder {
    fn push(&mut self, label: &str, path: &str) {
        if self.seen.insert(path.to_string()) {
            self.items.push(MenuItem::new(label, path));
        }
    }

    fn extend(&mut self, entries: &[(&str, &str)]) {
        for (label, path) in entries {
            self.push(label, path);
        }
    }
}

/// Build the menu for an identity and the role names it holds
pub fn build_menu(identity: Option<&SessionIdentity>, role_names: &BTreeSet<String>) -> Vec<MenuItem> {
    let mut menu = MenuBuilder::default();

    let Some(identity) = identity else {
        menu.push("Login", "/login");
        return menu.items;
    };

    let holds = |role: &str| role_names.contains(role);

    menu.push("Home", "/");
    if holds(roles::ADMINISTRATOR) || holds(roles::ACCOUNT_MANAGER) {
        menu.extend(ADMIN_ENTRIES);
    }
    if holds(roles::APPLICATION_MANAGER) {
        menu.extend(APPLICATION_MANAGER_ENTRIES);
    }
    if holds(roles::DEVELOPER) {
        menu.extend(DEVELOPER_ENTRIES);
    }
    menu.push("My account", &format!("/user/view/{}", identity.uid));
    menu.push("Logout", "/logout");

    menu.items
}
