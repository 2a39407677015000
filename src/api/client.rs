//! Platform API client
//!
//! Typed HTTP client for the admin endpoints of the platform REST API.
//! Every call carries the caller's bearer token; there is no client-level
//! credential. Calls are never retried: a failure is reported to the caller
//! straight away.

use crate::api::types::{Account, Application, Invite, Role, RoleAssignment, User, Var};
use crate::auth::{AUTHORIZATION, SessionIdentity};
use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::listing::ListParams;
use crate::util::QueryBuilder;
use crate::vars::VarFilter;
use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Default ordering for account and application listings
const DEFAULT_ORDER_BY: &str = "name";

/// Platform API client
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    timeout_secs: u64,
}

impl ApiClient {
    /// Create a new client from configuration
    pub fn new(config: &ApiConfig) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .danger_accept_invalid_certs(!config.verify_ssl)
            .user_agent(format!("studio-admin/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::Request)?;

        Ok(Self {
            http,
            base_url: config.base_url(),
            timeout_secs: config.timeout_secs,
        })
    }

    /// Build a URL for an API endpoint
    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    fn authenticate(&self, request: RequestBuilder, identity: &SessionIdentity) -> RequestBuilder {
        request
            .header(AUTHORIZATION, identity.bearer())
            .header(ACCEPT, "application/json")
    }

    /// Send a request and turn non-2xx statuses into errors
    async fn execute(&self, request: RequestBuilder) -> ApiResult<Response> {
        let response = request.send().await.map_err(|e| {
            warn!("Request failed: {}", e);
            if e.is_timeout() {
                ApiError::Timeout {
                    timeout_secs: self.timeout_secs,
                }
            } else {
                ApiError::Request(e)
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_response(status.as_u16(), &body))
    }

    /// Read a response body as JSON, unwrapping the `{result, data}` envelope
    async fn read_json(response: Response) -> ApiResult<Value> {
        let text = response.text().await.map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to read response: {}", e))
        })?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        let value: Value = serde_json::from_str(&text).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse response: {}", e))
        })?;
        unwrap_envelope(value)
    }

    /// Make a GET request for a collection.
    ///
    /// The API returns collections either as a JSON array or as an object
    /// keyed by id; both come back as a `Vec` in response order.
    #[instrument(skip(self, identity), fields(endpoint = %endpoint, uid = identity.uid))]
    pub async fn get_collection<T: DeserializeOwned>(
        &self,
        identity: &SessionIdentity,
        endpoint: &str,
    ) -> ApiResult<Vec<T>> {
        let request = self.authenticate(self.http.get(self.url(endpoint)), identity);
        let response = self.execute(request).await?;
        let value = Self::read_json(response).await?;
        let items = collection(value)?;
        debug!(count = items.len(), "Fetched collection");
        Ok(items)
    }

    /// Make a POST request with no body, returning the decoded JSON
    #[instrument(skip(self, identity), fields(endpoint = %endpoint, uid = identity.uid))]
    pub async fn post_empty(&self, identity: &SessionIdentity, endpoint: &str) -> ApiResult<Value> {
        let request = self.authenticate(self.http.post(self.url(endpoint)), identity);
        let response = self.execute(request).await?;
        Self::read_json(response).await
    }

    /// Fetch the full role catalog
    pub async fn roles_all(&self, identity: &SessionIdentity) -> ApiResult<Vec<Role>> {
        self.get_collection(identity, "role/all").await
    }

    /// Fetch the role assignments of a user
    pub async fn user_roles(
        &self,
        identity: &SessionIdentity,
        uid: u64,
    ) -> ApiResult<Vec<RoleAssignment>> {
        let query = QueryBuilder::new().param("uid", uid).build();
        self.get_collection(identity, &format!("user/role{}", query))
            .await
    }

    /// Fetch all accounts, ordered by name unless `params` says otherwise
    pub async fn accounts(
        &self,
        identity: &SessionIdentity,
        params: &[(&str, &str)],
    ) -> ApiResult<Vec<Account>> {
        let query = listing_query(params);
        self.get_collection(identity, &format!("account{}", query))
            .await
    }

    /// Fetch all applications, ordered by name unless `params` says otherwise
    pub async fn applications(
        &self,
        identity: &SessionIdentity,
        params: &[(&str, &str)],
    ) -> ApiResult<Vec<Application>> {
        let query = listing_query(params);
        self.get_collection(identity, &format!("application{}", query))
            .await
    }

    /// Fetch vars from the var store, filtered server-side where the API can
    pub async fn list_vars(
        &self,
        identity: &SessionIdentity,
        filter: &VarFilter,
    ) -> ApiResult<Vec<Var>> {
        let query = QueryBuilder::new().extend(filter.api_query()).build();
        self.get_collection(identity, &format!("var_store{}", query))
            .await
    }

    /// Fetch users matching the keyword and ordering of `params`
    pub async fn list_users(
        &self,
        identity: &SessionIdentity,
        params: &ListParams,
    ) -> ApiResult<Vec<User>> {
        let query = QueryBuilder::new().extend(params.api_query()).build();
        self.get_collection(identity, &format!("user{}", query))
            .await
    }

    /// Fetch pending invites
    pub async fn list_invites(
        &self,
        identity: &SessionIdentity,
        params: &ListParams,
    ) -> ApiResult<Vec<Invite>> {
        let query = QueryBuilder::new().extend(params.api_query()).build();
        self.get_collection(identity, &format!("invite{}", query))
            .await
    }

    /// End the session on the API side
    pub async fn logout(&self, identity: &SessionIdentity) -> ApiResult<()> {
        self.post_empty(identity, "logout").await?;
        Ok(())
    }
}

fn listing_query(params: &[(&str, &str)]) -> String {
    let builder = QueryBuilder::new().extend(params.iter().copied());
    if builder.contains("order_by") {
        builder.build()
    } else {
        builder.param("order_by", DEFAULT_ORDER_BY).build()
    }
}

/// Strip the `{result, data}` envelope when present.
///
/// An envelope whose `result` is `"error"` is reported as an API error even
/// though the HTTP status was 2xx.
fn unwrap_envelope(value: Value) -> ApiResult<Value> {
    match value {
        Value::Object(mut map) if map.contains_key("result") && map.contains_key("data") => {
            let data = map.remove("data").unwrap_or(Value::Null);
            if map.get("result").and_then(Value::as_str) == Some("error") {
                let message = data
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| data.to_string());
                return Err(ApiError::Api {
                    status: 200,
                    message,
                });
            }
            Ok(data)
        }
        other => Ok(other),
    }
}

fn collection<T: DeserializeOwned>(value: Value) -> ApiResult<Vec<T>> {
    let items = match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items,
        Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        other => {
            return Err(ApiError::InvalidResponse(format!(
                "Expected a collection, got: {}",
                other
            )));
        }
    };

    items
        .into_iter()
        .map(|item| {
            serde_json::from_value(item).map_err(|e| {
                ApiError::InvalidResponse(format!("Failed to parse collection item: {}", e))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unwrap_envelope() {
        let value = unwrap_envelope(json!({"result": "ok", "data": [1, 2]})).unwrap();
        assert_eq!(value, json!([1, 2]));

        // Not an envelope: passed through
        let raw = json!({"accid": 1, "name": "a"});
        assert_eq!(unwrap_envelope(raw.clone()).unwrap(), raw);
    }

    #[test]
    fn test_error_envelope() {
        let err = unwrap_envelope(json!({"result": "error", "data": {"message": "boom"}}))
            .unwrap_err();
        assert!(matches!(err, ApiError::Api { ref message, .. } if message == "boom"));
    }

    #[test]
    fn test_collection_from_array_and_map() {
        let from_array: Vec<Role> =
            collection(json!([{"rid": 1, "name": "Administrator"}])).unwrap();
        assert_eq!(from_array.len(), 1);

        let from_map: Vec<Role> = collection(json!({
            "2": {"rid": 2, "name": "Developer"},
            "1": {"rid": 1, "name": "Administrator"}
        }))
        .unwrap();
        let ids: Vec<u64> = from_map.iter().map(|r| r.rid).collect();
        assert_eq!(ids, vec![2, 1]);

        let empty: Vec<Role> = collection(Value::Null).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_collection_rejects_scalar() {
        let result: ApiResult<Vec<Role>> = collection(json!("nope"));
        assert!(matches!(result, Err(ApiError::InvalidResponse(_))));
    }

    #[test]
    fn test_listing_query_defaults_order() {
        assert_eq!(listing_query(&[]), "?order_by=name");
        assert_eq!(
            listing_query(&[("order_by", "accid"), ("direction", "desc")]),
            "?order_by=accid&direction=desc"
        );
    }
}
