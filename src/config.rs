//! Configuration management for cloudpack
//!
//! Settings come from, in increasing precedence: built-in defaults, one TOML
//! file, then environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::app::ClientConfig;
use crate::auth::FileSessionStore;
use crate::constants::{env, files, http, listing};
use crate::errors::{ConfigError, ConfigResult, Result};

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Build service connection settings
    pub service: ServiceConfigToml,
    /// Session storage
    pub session: SessionConfigToml,
    /// `package` task settings
    pub package: PackageConfigToml,
}

/// TOML-friendly service configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServiceConfigToml {
    /// Service root URL
    pub base_url: String,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for ServiceConfigToml {
    fn default() -> Self {
        Self {
            base_url: http::DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: http::DEFAULT_TIMEOUT.as_secs(),
            connect_timeout_secs: http::CONNECT_TIMEOUT.as_secs(),
        }
    }
}

/// TOML-friendly session configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct SessionConfigToml {
    /// Session file path (None = `<config_dir>/cloudpack/session.json`)
    pub session_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PackageConfigToml {
    /// Rows shown by `package list`
    pub list_limit: usize,
}

impl Default for PackageConfigToml {
    fn default() -> Self {
        Self {
            list_limit: listing::DEFAULT_LIMIT,
        }
    }
}

impl AppConfig {
    /// Load configuration with multi-source precedence:
    /// 1. Default values
    /// 2. Config file (explicit, project-local, then per-user)
    /// 3. Environment variables
    pub async fn load(config_file_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_file_override {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound { path }.into());
                }
                Some(path)
            }
            None => Self::find_config_file(),
        };

        let mut config = match config_path {
            Some(path) => Self::load_from_file(&path).await?,
            None => {
                debug!("No config file found, using defaults");
                Self::default()
            }
        };

        config.apply_env_overrides(std::env::var(env::API_URL).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply `CLOUDPACK_API_URL`
    pub fn apply_env_overrides(&mut self, api_url: Option<String>) {
        if let Some(url) = api_url.filter(|url| !url.trim().is_empty()) {
            debug!("Using service URL from {}", env::API_URL);
            self.service.base_url = url;
        }
    }

    /// Reject values that cannot produce a working client
    pub fn validate(&self) -> ConfigResult<()> {
        ClientConfig::parse_base_url(&self.service.base_url)?;

        if self.service.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "service.request_timeout_secs".to_string(),
                value: "0".to_string(),
                reason: "Timeout must be at least one second".to_string(),
            });
        }

        if self.package.list_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "package.list_limit".to_string(),
                value: "0".to_string(),
                reason: "At least one build must be listed".to_string(),
            });
        }

        Ok(())
    }

    /// Convert TOML-friendly configuration to the runtime client configuration
    pub fn to_runtime_config(&self) -> ConfigResult<ClientConfig> {
        Ok(ClientConfig {
            base_url: ClientConfig::parse_base_url(&self.service.base_url)?,
            request_timeout: Duration::from_secs(self.service.request_timeout_secs),
            connect_timeout: Duration::from_secs(self.service.connect_timeout_secs),
            ..ClientConfig::default()
        })
    }

    /// Where the session token is stored
    pub fn session_path(&self) -> ConfigResult<PathBuf> {
        match &self.session.session_file {
            Some(path) => Ok(path.clone()),
            None => FileSessionStore::default_path(),
        }
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![PathBuf::from(files::LOCAL_CONFIG_FILE)];
        match Self::get_default_config_path() {
            Ok(path) => search_paths.push(path),
            Err(e) => debug!("Skipping per-user config: {}", e),
        }

        let found = search_paths.into_iter().find(|path| path.exists());
        if let Some(path) = &found {
            debug!("Found config file: {}", path.display());
        }
        found
    }

    /// Get the default config file path for the current user
    fn get_default_config_path() -> ConfigResult<PathBuf> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir
            .join(files::CONFIG_DIR_NAME)
            .join(files::CONFIG_FILE_NAME))
    }

    /// Load configuration from a TOML file
    async fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let config: AppConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        debug!("Loaded configuration from: {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.service.base_url, http::DEFAULT_BASE_URL);
        assert_eq!(config.package.list_limit, 25);
        assert!(config.session.session_file.is_none());
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn test_config_loading_nonexistent_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        let result = AppConfig::load(Some(config_path)).await;
        assert!(matches!(
            result,
            Err(AppError::Config(ConfigError::NotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_config_loading_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("cloudpack.toml");

        let test_config = r#"
[service]
base_url = "http://localhost:8080/api"
request_timeout_secs = 5

[package]
list_limit = 10
"#;
        tokio::fs::write(&config_path, test_config).await.unwrap();

        let config = AppConfig::load_from_file(&config_path).await.unwrap();
        assert_eq!(config.service.base_url, "http://localhost:8080/api");
        assert_eq!(config.service.request_timeout_secs, 5);
        assert_eq!(config.package.list_limit, 10);

        // Unspecified values keep their defaults
        assert_eq!(
            config.service.connect_timeout_secs,
            http::CONNECT_TIMEOUT.as_secs()
        );

        let runtime = config.to_runtime_config().unwrap();
        assert_eq!(runtime.base_url.as_str(), "http://localhost:8080/api/");
        assert_eq!(runtime.request_timeout, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_config_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("broken.toml");
        tokio::fs::write(&config_path, "[service\nbase_url = 3")
            .await
            .unwrap();

        let result = AppConfig::load_from_file(&config_path).await;
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_env_override_replaces_base_url() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(Some("https://staging.example.com/v1".to_string()));
        assert_eq!(config.service.base_url, "https://staging.example.com/v1");

        config.apply_env_overrides(Some("  ".to_string()));
        assert_eq!(config.service.base_url, "https://staging.example.com/v1");

        config.apply_env_overrides(None);
        assert_eq!(config.service.base_url, "https://staging.example.com/v1");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.service.base_url = "ftp://example.com".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));

        let mut config = AppConfig::default();
        config.package.list_limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_session_path() {
        let mut config = AppConfig::default();
        config.session.session_file = Some(PathBuf::from("/tmp/cloudpack-session.json"));
        assert_eq!(
            config.session_path().unwrap(),
            PathBuf::from("/tmp/cloudpack-session.json")
        );
    }
}
