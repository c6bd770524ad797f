//! Configuration management.

mod file_config;

pub use file_config::{ConfigFile, ConfigFileError, LoggingConfig};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::HalError;
use crate::models::Format;
use crate::utils::DEFAULT_USER_AGENT;

/// Default HAL search endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.archives-ouvertes.fr/search/";

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "HAL_SEARCH";

/// Name of the config file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "hal-search.toml";

/// Client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Search API endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Portal sub-path (e.g. "inria"), exclusive with `collection`
    #[serde(default)]
    pub portal: Option<String>,

    /// Collection sub-path (e.g. "TDS-MACS"), exclusive with `portal`
    #[serde(default)]
    pub collection: Option<String>,

    /// Format used when a search does not ask for one
    #[serde(default)]
    pub default_format: Format,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: f64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            portal: None,
            collection: None,
            default_format: Format::default(),
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> f64 {
    60.0
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn is_set(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

impl ClientConfig {
    /// Check the invariants a client relies on
    pub fn validate(&self) -> Result<(), HalError> {
        if is_set(&self.portal) && is_set(&self.collection) {
            return Err(HalError::Config(
                "Either 'portal' or 'collection' can be provided, but not both".to_string(),
            ));
        }

        self.timeout()?;

        Ok(())
    }

    /// Request timeout, rejecting values that are not a positive number of seconds
    pub fn timeout(&self) -> Result<Duration, HalError> {
        Duration::try_from_secs_f64(self.timeout_secs)
            .ok()
            .filter(|timeout| !timeout.is_zero())
            .ok_or_else(|| {
                HalError::Config(format!(
                    "Timeout must be a positive number of seconds, got {}",
                    self.timeout_secs
                ))
            })
    }
}

/// Load settings from an optional file, then apply environment overrides.
///
/// Environment variables use the `HAL_SEARCH_` prefix and `__` between
/// section and key, e.g. `HAL_SEARCH_CLIENT__PORTAL=inria`.
pub fn load_config(path: Option<&Path>) -> Result<ConfigFile, config::ConfigError> {
    let mut builder = config::Config::builder();

    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}

/// Find a config file in the working directory or the user config directory
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("hal-search").join("config.toml"))
        .filter(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.default_format, Format::Json);
        assert_eq!(config.timeout().unwrap(), Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_conflict() {
        let config = ClientConfig {
            portal: Some("inria".to_string()),
            collection: Some("TDS-MACS".to_string()),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(HalError::Config(_))));
    }

    #[test]
    fn test_validate_blank_counts_as_unset() {
        let config = ClientConfig {
            portal: Some(String::new()),
            collection: Some("TDS-MACS".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_timeout() {
        for timeout_secs in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = ClientConfig {
                timeout_secs,
                ..Default::default()
            };
            assert!(config.validate().is_err());
            assert!(matches!(config.timeout(), Err(HalError::Config(_))));
        }
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hal-search.toml");
        std::fs::write(
            &path,
            r#"
[client]
collection = "TDS-MACS"
default_format = "xml-tei"
timeout_secs = 5
"#,
        )
        .unwrap();

        let config = load_config(Some(path.as_path())).unwrap();
        assert_eq!(config.client.collection.as_deref(), Some("TDS-MACS"));
        assert_eq!(config.client.default_format, Format::XmlTei);
        assert_eq!(config.client.timeout_secs, 5.0);
        assert_eq!(config.client.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_load_config_env_override() {
        std::env::set_var("HAL_SEARCH_LOGGING__LEVEL", "trace");
        let config = load_config(None);
        std::env::remove_var("HAL_SEARCH_LOGGING__LEVEL");

        let config = config.unwrap();
        assert_eq!(config.logging.level, "trace");
        assert_eq!(config.client, ClientConfig::default());
    }

    #[test]
    fn test_load_config_missing_file() {
        let path = PathBuf::from("/nonexistent/hal-search.toml");
        assert!(load_config(Some(path.as_path())).is_err());
    }
}
