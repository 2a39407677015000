//! Error types for studio-admin
//!
//! This module defines the error hierarchy used throughout the crate.
//! Remote API failures split into two families that callers must treat
//! differently: `ApiError::Unauthorized` means the session is no longer
//! valid, everything else is an upstream failure.

use serde::Serialize;
use thiserror::Error;

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {field}")]
    Missing { field: String },
}

/// Remote API errors
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unauthorised")]
    Unauthorized,

    #[error("Invalid response from API: {0}")]
    InvalidResponse(String),

    #[error("Request timeout after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },
}

impl ApiError {
    /// Create an error from an HTTP status code and response body.
    ///
    /// The API reports failures as `{"error": {"message": "..."}}`; that
    /// message is preferred over the raw body.
    pub fn from_response(status: u16, body: &str) -> Self {
        if status == 401 {
            return ApiError::Unauthorized;
        }

        let message = extract_error_message(body).unwrap_or_else(|| {
            if body.trim().is_empty() {
                format!("HTTP {}", status)
            } else {
                body.to_string()
            }
        });

        ApiError::Api { status, message }
    }

    /// Whether this error means the session is invalid (HTTP 401)
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    /// Whether this error is an upstream failure (anything but 401)
    pub fn is_upstream(&self) -> bool {
        !self.is_auth()
    }
}

fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let message = value.get("error")?.get("message")?;
    match message {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// A role id referenced by an assignment has no entry in the role catalog.
///
/// Recovered during resolution: the entry is skipped and recorded.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("Role {rid} is assigned but missing from the role catalog")]
pub struct IntegrityError {
    pub rid: u64,
}

/// Malformed or missing request parameters at the page layer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid value for '{param}': {value}")]
    InvalidParam { param: String, value: String },
}

impl ValidationError {
    pub fn invalid(param: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidParam {
            param: param.into(),
            value: value.into(),
        }
    }
}

/// Local session identity errors, raised before any API call.
///
/// A session the API rejects is [`ApiError::Unauthorized`], not this.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session needs both a user id and a token")]
    Incomplete,

    #[error("Session token is blank")]
    BlankToken,
}

/// Result type alias for remote API operations
pub type ApiResult<T> = std::result::Result<T, ApiError>;
