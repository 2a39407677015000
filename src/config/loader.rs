//! Configuration loader with layered sources
//!
//! Loads configuration from multiple sources with the following precedence
//! (highest to lowest):
//! 1. Environment variables (STUDIO_ADMIN_*)
//! 2. Configuration file (TOML)
//! 3. Default values

use crate::config::types::AppConfig;
use crate::error::ConfigError;
use config::{Config, Environment, File, FileFormat};
use std::path::Path;

/// Default configuration file paths to check (in order)
const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "studio-admin.toml",
    ".studio-admin.toml",
    "~/.config/studio-admin/config.toml",
    "/etc/studio-admin/config.toml",
];

/// Load configuration from a TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from_str(toml_str, FileFormat::Toml))
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// Load configuration from files and environment
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. Start with defaults (handled by serde defaults on AppConfig)

    // 2. Add configuration file
    if let Some(path) = config_path {
        // Explicit path provided - must exist
        if !Path::new(path).exists() {
            return Err(ConfigError::Load(format!(
                "Configuration file not found: {}",
                path
            )));
        }
        builder = builder.add_source(File::new(path, FileFormat::Toml));
    } else {
        // Try default paths (first existing one wins)
        for path in DEFAULT_CONFIG_PATHS {
            let expanded = shellexpand::tilde(path);
            if Path::new(expanded.as_ref()).exists() {
                builder = builder.add_source(File::new(&expanded, FileFormat::Toml));
                break;
            }
        }
    }

    // 3. Add environment variables with STUDIO_ADMIN_ prefix
    // e.g., STUDIO_ADMIN_API__URL, STUDIO_ADMIN_ADMIN__PAGINATION_STEP
    // Double underscore (__) maps to nested keys (api.url)
    builder = builder.add_source(
        Environment::with_prefix("STUDIO_ADMIN")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// Validate configuration values
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.api.url.is_empty() {
        return Err(ConfigError::Missing {
            field: "api.url".to_string(),
        });
    }

    if !config.api.url.starts_with("http://") && !config.api.url.starts_with("https://") {
        return Err(ConfigError::Invalid {
            message: format!(
                "api.url must start with http:// or https://, got: {}",
                config.api.url
            ),
        });
    }

    if config.api.core_account.trim().is_empty() {
        return Err(ConfigError::Missing {
            field: "api.core_account".to_string(),
        });
    }

    if config.api.core_application.trim().is_empty() {
        return Err(ConfigError::Missing {
            field: "api.core_application".to_string(),
        });
    }

    if config.api.timeout_secs == 0 {
        return Err(ConfigError::Invalid {
            message: "api.timeout_secs must be greater than 0".to_string(),
        });
    }

    if config.admin.pagination_step == 0 {
        return Err(ConfigError::Invalid {
            message: "admin.pagination_step must be greater than 0".to_string(),
        });
    }

    Ok(())
}
