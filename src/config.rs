//! Client configuration.
//!
//! [`ClientConfig`] is built once, handed to [`TransferClient::new`](crate::TransferClient::new)
//! and never mutated afterwards. Values come from the defaults below, from the
//! process environment ([`ClientConfig::from_env`]), or from any key/value
//! lookup ([`ClientConfig::from_lookup`]).

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;
use url::Url;

/// Default service base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:10103/api";

/// Environment variable overriding the base URL.
pub const ENV_BASE_URL: &str = "RAGFLOW_API_URL";

/// Environment variable overriding the platform flag.
pub const ENV_PLATFORM: &str = "RAGFLOW_PLATFORM";

/// Default request timeout (15 seconds).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(15_000);

/// Errors raised while building a [`ClientConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The base URL could not be parsed or cannot carry endpoint paths.
    #[error("invalid base URL '{value}': {reason}")]
    InvalidBaseUrl {
        /// The rejected value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Host platform flag.
///
/// Informational only: strategy selection is driven by
/// [`PlatformCapabilities`](crate::strategy::PlatformCapabilities), never by this flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AppPlatform {
    /// Browser page (`h5` and `web` are interchangeable).
    #[default]
    H5,
    /// Any other platform name, kept verbatim.
    Other(String),
}

impl AppPlatform {
    /// Parses a platform flag.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("h5") || trimmed.eq_ignore_ascii_case("web") {
            Self::H5
        } else {
            Self::Other(trimmed.to_string())
        }
    }
}

impl fmt::Display for AppPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::H5 => f.write_str("h5"),
            Self::Other(name) => f.write_str(name),
        }
    }
}

/// Feature switches carried with the configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureFlags {
    /// Analytics reporting (off by default; nothing in this crate reports).
    pub enable_analytics: bool,
}

/// Immutable client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: Url,
    platform: AppPlatform,
    request_timeout: Duration,
    feature_flags: FeatureFlags,
}

impl Default for ClientConfig {
    #[allow(clippy::expect_used)]
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"), // Static value, safe to panic
            platform: AppPlatform::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            feature_flags: FeatureFlags::default(),
        }
    }
}

impl ClientConfig {
    /// Creates a configuration with an explicit base URL and default settings otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if `base_url` does not parse as
    /// an absolute http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            ..Self::default()
        })
    }

    /// Reads overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if `RAGFLOW_API_URL` is set to an
    /// invalid URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads overrides through `lookup`. Unset, empty or whitespace values
    /// keep the default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the base URL override is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(base_url) = read(ENV_BASE_URL) {
            config.base_url = parse_base_url(&base_url)?;
        }
        if let Some(platform) = read(ENV_PLATFORM) {
            config.platform = AppPlatform::parse(&platform);
        }
        debug!(base_url = %config.base_url, platform = %config.platform, "client configuration loaded");
        Ok(config)
    }

    /// Replaces the platform flag.
    #[must_use]
    pub fn with_platform(mut self, platform: AppPlatform) -> Self {
        self.platform = platform;
        self
    }

    /// Replaces the feature flags.
    #[must_use]
    pub fn with_feature_flags(mut self, feature_flags: FeatureFlags) -> Self {
        self.feature_flags = feature_flags;
        self
    }

    /// Service base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Platform flag.
    #[must_use]
    pub fn platform(&self) -> &AppPlatform {
        &self.platform
    }

    /// Configured request timeout.
    ///
    /// This value is carried but not applied: no request issued by this crate
    /// is bounded by it. Callers that need a deadline wrap the call in
    /// `tokio::time::timeout` themselves.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Feature flags.
    #[must_use]
    pub fn feature_flags(&self) -> FeatureFlags {
        self.feature_flags
    }

    /// Joins an endpoint path onto the base URL, keeping any base path prefix.
    ///
    /// `endpoint("/ragflowai/heartbeat")` on `http://host/api` yields
    /// `http://host/api/ragflowai/heartbeat`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }
}

fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim()).map_err(|e| ConfigError::InvalidBaseUrl {
        value: value.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(ConfigError::InvalidBaseUrl {
            value: value.to_string(),
            reason: "expected an absolute http(s) URL".to_string(),
        });
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url().as_str(), "http://localhost:10103/api");
        assert_eq!(config.platform(), &AppPlatform::H5);
        assert_eq!(config.request_timeout(), Duration::from_secs(15));
        assert!(!config.feature_flags().enable_analytics);
    }

    #[test]
    fn test_from_lookup_overrides_base_url_and_platform() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            (ENV_BASE_URL, "https://docs.example.com/gateway"),
            (ENV_PLATFORM, "app-plus"),
        ]))
        .unwrap();
        assert_eq!(
            config.base_url().as_str(),
            "https://docs.example.com/gateway"
        );
        assert_eq!(
            config.platform(),
            &AppPlatform::Other("app-plus".to_string())
        );
    }

    #[test]
    fn test_from_lookup_ignores_blank_values() {
        let config =
            ClientConfig::from_lookup(lookup_from(&[(ENV_BASE_URL, "   "), (ENV_PLATFORM, "")]))
                .unwrap();
        assert_eq!(config.base_url().as_str(), DEFAULT_BASE_URL);
        assert_eq!(config.platform(), &AppPlatform::H5);
    }

    #[test]
    fn test_from_lookup_rejects_invalid_base_url() {
        let result = ClientConfig::from_lookup(lookup_from(&[(ENV_BASE_URL, "not a url")]));
        assert!(matches!(result, Err(ConfigError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn test_new_rejects_non_http_scheme() {
        let result = ClientConfig::new("ftp://files.example.com/");
        assert!(matches!(result, Err(ConfigError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn test_platform_h5_and_web_are_interchangeable() {
        assert_eq!(AppPlatform::parse("h5"), AppPlatform::H5);
        assert_eq!(AppPlatform::parse("WEB"), AppPlatform::H5);
        assert_eq!(AppPlatform::H5.to_string(), "h5");
    }

    #[test]
    fn test_endpoint_keeps_base_path_prefix() {
        let config = ClientConfig::new("http://localhost:10103/api/").unwrap();
        assert_eq!(
            config.endpoint("/ragflowai/heartbeat"),
            "http://localhost:10103/api/ragflowai/heartbeat"
        );

        let bare = ClientConfig::new("http://127.0.0.1:9000").unwrap();
        assert_eq!(
            bare.endpoint("ragflowai/status/abc"),
            "http://127.0.0.1:9000/ragflowai/status/abc"
        );
    }
}
