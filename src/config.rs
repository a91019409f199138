//! Client configuration.
//!
//! Defaults work against a local development server; embedders override
//! via the builder methods or the `DROPLINE_*` environment variables.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Default API base URL.
const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid base URL '{0}': must start with http:// or https://")]
    InvalidBaseUrl(String),

    #[error("invalid value for {name}: '{value}'")]
    InvalidEnvVar { name: &'static str, value: String },

    #[error("no home directory available for credential storage; set an explicit credentials path")]
    NoHomeDirectory,

    #[error("failed to initialize the HTTP transport: {0}")]
    Transport(String),
}

/// Configuration for an [`ApiClient`](crate::api::ApiClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL, without a trailing slash.
    pub base_url: String,
    /// Where to persist the credential pair. `None` means the default
    /// location under the home directory.
    pub credentials_path: Option<PathBuf>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials_path: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL. Trailing slashes are trimmed so path joining
    /// stays predictable.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        self.base_url = base_url;
        self
    }

    /// Set an explicit credentials file path.
    pub fn with_credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = Some(path.into());
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build a configuration from the environment.
    ///
    /// Reads `DROPLINE_BASE_URL`, `DROPLINE_CREDENTIALS_PATH`, and
    /// `DROPLINE_TIMEOUT_SECS`; unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("DROPLINE_BASE_URL") {
            config = config.with_base_url(url);
        }

        if let Ok(path) = std::env::var("DROPLINE_CREDENTIALS_PATH") {
            if !path.is_empty() {
                config.credentials_path = Some(PathBuf::from(path));
            }
        }

        if let Ok(secs) = std::env::var("DROPLINE_TIMEOUT_SECS") {
            let parsed: u64 = match secs.parse() {
                Ok(value) => value,
                Err(_) => {
                    return Err(ConfigError::InvalidEnvVar {
                        name: "DROPLINE_TIMEOUT_SECS",
                        value: secs,
                    })
                }
            };
            config.timeout = Duration::from_secs(parsed);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values that can never work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::InvalidBaseUrl(self.base_url.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        std::env::remove_var("DROPLINE_BASE_URL");
        std::env::remove_var("DROPLINE_CREDENTIALS_PATH");
        std::env::remove_var("DROPLINE_TIMEOUT_SECS");
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.credentials_path, None);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_builder_methods() {
        let config = ClientConfig::new()
            .with_base_url("https://api.dropline.io")
            .with_credentials_path("/tmp/creds.json")
            .with_timeout(Duration::from_secs(5));

        assert_eq!(config.base_url, "https://api.dropline.io");
        assert_eq!(
            config.credentials_path,
            Some(PathBuf::from("/tmp/creds.json"))
        );
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = ClientConfig::new().with_base_url("https://api.dropline.io///");
        assert_eq!(config.base_url, "https://api.dropline.io");
    }

    #[test]
    fn test_validate_rejects_bad_scheme() {
        let config = ClientConfig::new().with_base_url("ftp://api.dropline.io");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBaseUrl(_))
        ));

        let config = ClientConfig::new().with_base_url("");
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_from_env_defaults_when_unset() {
        clear_env();
        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        std::env::set_var("DROPLINE_BASE_URL", "https://staging.dropline.io/");
        std::env::set_var("DROPLINE_CREDENTIALS_PATH", "/tmp/dropline-test.json");
        std::env::set_var("DROPLINE_TIMEOUT_SECS", "10");

        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config.base_url, "https://staging.dropline.io");
        assert_eq!(
            config.credentials_path,
            Some(PathBuf::from("/tmp/dropline-test.json"))
        );
        assert_eq!(config.timeout, Duration::from_secs(10));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_timeout() {
        clear_env();
        std::env::set_var("DROPLINE_TIMEOUT_SECS", "soon");

        let result = ClientConfig::from_env();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidEnvVar { name, .. }) if name == "DROPLINE_TIMEOUT_SECS"
        ));

        clear_env();
    }
}
