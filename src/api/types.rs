//! API response types
//!
//! Records returned by the platform API. Field names follow the wire format
//! (`rid`, `accid`, `appid`, `vid`). Ids may arrive as JSON numbers or as
//! numeric strings.

use serde::{Deserialize, Deserializer, Serialize};

/// Role catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    #[serde(deserialize_with = "de_id")]
    pub rid: u64,
    pub name: String,
}

/// One role granted to a user, optionally narrowed to an account and
/// an application.
///
/// `None` is a wildcard: a null account means every account, a null
/// application means every application of the account. Both keys must be
/// present on the wire; a row without them is rejected rather than read as
/// a wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    #[serde(deserialize_with = "de_opt_id")]
    pub accid: Option<u64>,
    #[serde(deserialize_with = "de_opt_id")]
    pub appid: Option<u64>,
    #[serde(deserialize_with = "de_id")]
    pub rid: u64,
}

impl RoleAssignment {
    pub fn new(accid: Option<u64>, appid: Option<u64>, rid: u64) -> Self {
        Self { accid, appid, rid }
    }
}

/// Platform account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(deserialize_with = "de_id")]
    pub accid: u64,
    pub name: String,
}

/// Application, owned by one account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    #[serde(deserialize_with = "de_id")]
    pub appid: u64,
    #[serde(deserialize_with = "de_id")]
    pub accid: u64,
    pub name: String,
}

/// Variable from the var store, scoped to an application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Var {
    #[serde(deserialize_with = "de_id")]
    pub vid: u64,
    #[serde(deserialize_with = "de_id")]
    pub appid: u64,
    pub key: String,
    #[serde(default)]
    pub val: serde_json::Value,
}

/// Console user. Fields beyond the id and name are passed through as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "de_id")]
    pub uid: u64,
    #[serde(default)]
    pub username: String,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

/// Pending user invite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invite {
    #[serde(deserialize_with = "de_id")]
    pub iid: u64,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Num(u64),
    Str(String),
}

impl RawId {
    fn into_id<E: serde::de::Error>(self) -> Result<u64, E> {
        match self {
            RawId::Num(n) => Ok(n),
            RawId::Str(s) => s
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("invalid id: {s:?}"))),
        }
    }
}

fn de_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    RawId::deserialize(deserializer)?.into_id()
}

fn de_opt_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    match Option::<RawId>::deserialize(deserializer)? {
        Some(raw) => raw.into_id().map(Some),
        None => Ok(None),
    }
}
