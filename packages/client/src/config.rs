//! Client configuration.
//!
//! The defaults are embedded at compile time from `config/default.toml`.
//! A user-supplied TOML file may override any subset of fields, and the
//! `REALTY_MAP_BASE_URL` environment variable overrides the backend URL.

use std::path::Path;
use std::time::Duration;

use realty_map_models::NearbySort;
use serde::Deserialize;

use crate::retry::RetryPolicy;

/// Environment variable that overrides [`ClientConfig::base_url`].
pub const BASE_URL_ENV: &str = "REALTY_MAP_BASE_URL";

const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for [`ClientConfig`].
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Everything the client needs to talk to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    /// Backend origin, e.g. `http://127.0.0.1:5000`.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
    /// Location directory settings.
    pub locations: LocationsConfig,
    /// Nearby-search defaults.
    pub nearby: NearbyConfig,
}

/// Location directory settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LocationsConfig {
    /// Retry policy for `GET /get_locations`.
    pub retry: RetryPolicy,
}

/// Nearby-search defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NearbyConfig {
    /// Search radius in metres.
    pub radius_m: Option<u32>,
    /// Result ordering.
    pub sort: Option<NearbySort>,
}

/// Overlay applied on top of the defaults; every field is optional.
#[derive(Debug, Default, Deserialize)]
struct PartialConfig {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    user_agent: Option<String>,
    locations: Option<LocationsConfig>,
    nearby: Option<NearbyConfig>,
}

impl ClientConfig {
    /// Loads the embedded defaults, applies `path` if given, then the
    /// environment override.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::default_config()?;

        if let Some(path) = path {
            log::debug!("Loading client config from {}", path.display());
            let text = std::fs::read_to_string(path)?;
            config.apply(toml::from_str(&text)?);
        }

        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            log::debug!("{BASE_URL_ENV} overrides base_url");
            config.base_url = base_url;
        }

        Ok(config)
    }

    /// The embedded defaults with no overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if the embedded file is malformed.
    pub fn default_config() -> Result<Self, ConfigError> {
        Ok(toml::from_str(DEFAULT_CONFIG)?)
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn apply(&mut self, overlay: PartialConfig) {
        if let Some(base_url) = overlay.base_url {
            self.base_url = base_url;
        }
        if let Some(timeout_secs) = overlay.timeout_secs {
            self.timeout_secs = timeout_secs;
        }
        if let Some(user_agent) = overlay.user_agent {
            self.user_agent = user_agent;
        }
        if let Some(locations) = overlay.locations {
            self.locations = locations;
        }
        if let Some(nearby) = overlay.nearby {
            self.nearby = nearby;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::Backoff;

    #[test]
    fn embedded_defaults_parse() {
        let config = ClientConfig::default_config().unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.locations.retry, RetryPolicy::immediate(3));
        assert_eq!(config.nearby.radius_m, Some(5000));
        assert_eq!(config.nearby.sort, Some(NearbySort::Distance));
    }

    #[test]
    fn overlay_replaces_only_given_fields() {
        let mut config = ClientConfig::default_config().unwrap();
        let overlay: PartialConfig = toml::from_str(
            r#"
            base_url = "https://homes.example.com"

            [locations.retry]
            max_attempts = 5
            backoff = { type = "exponential", base = 200, max = 2000 }
            "#,
        )
        .unwrap();
        config.apply(overlay);

        assert_eq!(config.base_url, "https://homes.example.com");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.locations.retry.max_attempts, 5);
        assert_eq!(
            config.locations.retry.backoff,
            Backoff::Exponential {
                base: Duration::from_millis(200),
                max: Duration::from_millis(2000),
            }
        );
    }
}
