//! Configuration types for studio-admin
//!
//! This module defines the configuration structure that can be loaded from
//! TOML files and/or environment variables.

use serde::Deserialize;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Remote API connection settings
    pub api: ApiConfig,

    /// Admin page settings
    pub admin: AdminConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Remote API connection configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API domain (e.g., `https://api.example.com`)
    pub url: String,

    /// Account that hosts the core resources
    pub core_account: String,

    /// Application that hosts the core resources
    pub core_application: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Whether to verify SSL certificates
    pub verify_ssl: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: "https://localhost".to_string(),
            core_account: "apiopenstudio".to_string(),
            core_application: "core".to_string(),
            timeout_secs: 30,
            verify_ssl: true,
        }
    }
}

impl ApiConfig {
    /// Get the base URL every core resource hangs off
    pub fn base_url(&self) -> String {
        format!(
            "{}/{}/{}/",
            self.url.trim_end_matches('/'),
            self.core_account.trim_matches('/'),
            self.core_application.trim_matches('/')
        )
    }
}

/// Admin page configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Number of rows per listing page
    pub pagination_step: usize,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            pagination_step: 20,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Output format (pretty, json)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// JSON structured output
    Json,
}
