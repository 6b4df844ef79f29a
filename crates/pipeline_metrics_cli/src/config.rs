//! Configuration management for the pipeline metrics CLI.
//!
//! The configuration is stored in TOML format and names the region used for
//! dashboards, the metrics namespace, the two service endpoints and the
//! dashboard size limits. Bearer tokens are never stored in the file; each
//! endpoint names the environment variable that holds its token.
//!
//! ```toml
//! region = "ap-southeast-2"
//! namespace = "Pipeline"
//!
//! [history]
//! base_url = "https://pipelines.example.com/"
//! token_env = "PIPELINE_HISTORY_TOKEN"
//!
//! [metrics]
//! base_url = "https://metrics.example.com/"
//! token_env = "METRICS_TOKEN"
//!
//! [dashboard]
//! max_metrics_per_dashboard = 500
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use pipeline_client::ServiceClient;
use pipeline_metrics_core::{DashboardLimits, DEFAULT_NAMESPACE};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::Error;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "pipeline-metrics.toml";

const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_HISTORY_URL: &str = "https://pipelines.example.com/";
const DEFAULT_METRICS_URL: &str = "https://metrics.example.com/";
const DEFAULT_HISTORY_TOKEN_ENV: &str = "PIPELINE_HISTORY_TOKEN";
const DEFAULT_METRICS_TOKEN_ENV: &str = "METRICS_TOKEN";

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// Main configuration structure for the pipeline metrics CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Region shown on dashboards and used in dashboard names
    pub region: String,

    /// Metrics namespace observations are written to and dashboards read from
    #[serde(default = "AppConfig::default_namespace")]
    pub namespace: String,

    pub history: EndpointConfig,

    pub metrics: EndpointConfig,

    #[serde(default)]
    pub dashboard: DashboardConfig,
}

impl AppConfig {
    fn default_namespace() -> String {
        DEFAULT_NAMESPACE.to_string()
    }

    /// Loads configuration from a TOML file at the specified path.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the file does not exist, cannot be read, or
    /// does not match the expected structure.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use std::path::Path;
    /// use pipeline_metrics_cli::config::AppConfig;
    ///
    /// match AppConfig::load(Path::new("./pipeline-metrics.toml")) {
    ///     Ok(config) => println!("Publishing to namespace {}", config.namespace),
    ///     Err(e) => eprintln!("Failed to load config: {}", e),
    /// }
    /// ```
    pub fn load(path: &Path) -> Result<Self, Error> {
        debug!("Loading configuration from {:?}", path);

        if !path.exists() {
            return Err(Error::Config(format!(
                "Configuration file not found: {:?}",
                path
            )));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read configuration file: {}", e)))?;

        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse configuration file: {}", e)))?;

        Ok(config)
    }

    /// Saves the configuration to a TOML file, creating parent directories as needed.
    ///
    /// Overwrites an existing file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if serialization fails or the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), Error> {
        debug!("Saving configuration to {:?}", path);

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize configuration: {}", e)))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create directory: {}", e)))?;
        }

        fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write configuration file: {}", e)))?;

        info!("Configuration saved to {:?}", path);
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            namespace: Self::default_namespace(),
            history: EndpointConfig {
                base_url: DEFAULT_HISTORY_URL.to_string(),
                token_env: Some(DEFAULT_HISTORY_TOKEN_ENV.to_string()),
            },
            metrics: EndpointConfig {
                base_url: DEFAULT_METRICS_URL.to_string(),
                token_env: Some(DEFAULT_METRICS_TOKEN_ENV.to_string()),
            },
            dashboard: DashboardConfig::default(),
        }
    }
}

/// Location and credentials of one service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub base_url: String,

    /// Name of the environment variable holding the bearer token, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,
}

impl EndpointConfig {
    /// Reads the bearer token from the configured environment variable.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` when a variable is named but not set.
    pub fn token(&self) -> Result<Option<SecretString>, Error> {
        let Some(name) = &self.token_env else {
            return Ok(None);
        };

        match std::env::var(name) {
            Ok(value) => Ok(Some(SecretString::from(value))),
            Err(_) => Err(Error::Config(format!(
                "Environment variable '{}' is not set",
                name
            ))),
        }
    }

    /// Builds a client for this endpoint.
    pub fn connect(&self) -> Result<ServiceClient, Error> {
        let token = self.token()?;
        Ok(ServiceClient::new(&self.base_url, token)?)
    }
}

/// Dashboard size limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "DashboardConfig::default_max_metrics_per_dashboard")]
    pub max_metrics_per_dashboard: usize,
}

impl DashboardConfig {
    fn default_max_metrics_per_dashboard() -> usize {
        DashboardLimits::default().max_metrics_per_dashboard
    }

    pub fn limits(&self) -> DashboardLimits {
        DashboardLimits::new(self.max_metrics_per_dashboard)
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            max_metrics_per_dashboard: Self::default_max_metrics_per_dashboard(),
        }
    }
}

/// Resolves the path to the configuration file.
///
/// Uses `config_path` when given, otherwise `pipeline-metrics.toml` in the
/// current directory.
pub fn get_config_path(config_path: Option<&str>) -> PathBuf {
    if let Some(path) = config_path {
        PathBuf::from(path)
    } else {
        let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        current_dir.join(DEFAULT_CONFIG_FILENAME)
    }
}
