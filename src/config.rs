//! Backend endpoint configuration
//!
//! Resolves the backend origin from the environment, with a builder for
//! programmatic overrides.

use thiserror::Error;

/// Default backend origin (local development server)
const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Environment variable overriding the backend origin
const API_URL_ENV: &str = "TRAINDESK_API_URL";

/// Backend configuration
#[derive(Debug, Clone)]
pub struct Config {
    api_url: String,
}

impl Default for Config {
    fn default() -> Self {
        let api_url =
            std::env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self { api_url: normalize(api_url) }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new ConfigBuilder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Get the full URL for an API endpoint
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// The configured backend origin
    pub fn origin(&self) -> &str {
        &self.api_url
    }
}

/// Builder for Config
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    api_url: Option<String>,
}

impl ConfigBuilder {
    /// Set the backend origin
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<Config, ConfigError> {
        let api_url = match self.api_url {
            Some(url) => {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(ConfigError::InvalidUrl(url));
                }
                url
            }
            None => std::env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
        };
        Ok(Config { api_url: normalize(api_url) })
    }
}

fn normalize(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}
