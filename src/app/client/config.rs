//! HTTP client configuration and building logic
//!
//! This module handles the configuration and construction of the HTTP client
//! used for every build service call.

use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::constants::http;
use crate::errors::{ConfigError, ConfigResult, Result};

/// Runtime settings for talking to the build service
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Service root; endpoint paths are joined onto it
    pub base_url: Url,
    /// Request timeout for API calls
    pub request_timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Whole-transfer timeout for artifact downloads
    pub download_timeout: Duration,
    /// TCP nodelay (disable Nagle's algorithm)
    pub tcp_nodelay: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(http::DEFAULT_BASE_URL).expect("default base URL is valid"),
            request_timeout: http::DEFAULT_TIMEOUT,
            connect_timeout: http::CONNECT_TIMEOUT,
            download_timeout: http::DOWNLOAD_TIMEOUT,
            tcp_nodelay: true,
        }
    }
}

impl ClientConfig {
    /// Parse a base URL, making sure relative joins stay beneath it
    pub fn parse_base_url(raw: &str) -> ConfigResult<Url> {
        let normalized = if raw.ends_with('/') {
            raw.to_string()
        } else {
            format!("{}/", raw)
        };

        let url = Url::parse(&normalized).map_err(|e| ConfigError::InvalidValue {
            field: "service.base_url".to_string(),
            value: raw.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                field: "service.base_url".to_string(),
                value: raw.to_string(),
                reason: "Only http and https URLs are supported".to_string(),
            });
        }

        Ok(url)
    }

    /// Builds the HTTP client with the specified configuration
    pub fn build_http_client(&self) -> Result<Client> {
        let client = Client::builder()
            .timeout(self.request_timeout)
            .connect_timeout(self.connect_timeout)
            .user_agent(http::USER_AGENT)
            .tcp_nodelay(self.tcp_nodelay)
            .build()?;
        Ok(client)
    }

    /// Absolute URL of an endpoint path below the base URL
    pub fn endpoint(&self, path: &str) -> ConfigResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ConfigError::InvalidValue {
                field: "endpoint".to_string(),
                value: path.to_string(),
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert!(config.tcp_nodelay);
        assert_eq!(config.request_timeout, http::DEFAULT_TIMEOUT);
        assert!(config.download_timeout > config.request_timeout);
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let url = ClientConfig::parse_base_url("https://build.example.com/api/v1").unwrap();
        assert_eq!(url.as_str(), "https://build.example.com/api/v1/");
    }

    #[test]
    fn test_base_url_rejects_other_schemes() {
        assert!(ClientConfig::parse_base_url("ftp://build.example.com").is_err());
        assert!(ClientConfig::parse_base_url("not a url").is_err());
    }

    #[test]
    fn test_endpoint_joins_below_base() {
        let config = ClientConfig {
            base_url: ClientConfig::parse_base_url("https://build.example.com/api/v1").unwrap(),
            ..Default::default()
        };
        let url = config.endpoint("apps/abc/builds").unwrap();
        assert_eq!(url.as_str(), "https://build.example.com/api/v1/apps/abc/builds");
    }

    #[test]
    fn test_http_client_creation() {
        let config = ClientConfig::default();
        assert!(config.build_http_client().is_ok());
    }
}
