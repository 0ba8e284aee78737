//! Client configuration loaded from environment variables

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Connection settings for [`HttpClient`](crate::HttpClient)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Node URL (default: http://localhost:9200)
    #[serde(default = "default_url")]
    pub url: String,

    /// Per-call timeout; unset leaves the transport default
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_url() -> String {
    "http://localhost:9200".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_secs: None,
        }
    }
}

impl ClientConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env::var("ESBAR_URL").unwrap_or_else(|_| default_url()),
            timeout_secs: match env::var("ESBAR_TIMEOUT_SECS") {
                Ok(value) => Some(
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidTimeout(value))?,
                ),
                Err(_) => None,
            },
        })
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid timeout in ESBAR_TIMEOUT_SECS: {0}")]
    InvalidTimeout(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.url, "http://localhost:9200");
        assert!(config.timeout().is_none());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: ClientConfig = serde_json::from_str(r#"{"timeout_secs": 5}"#).unwrap();
        assert_eq!(config.url, "http://localhost:9200");
        assert_eq!(config.timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_from_env_timeout() {
        env::set_var("ESBAR_TIMEOUT_SECS", "soon");
        let result = ClientConfig::from_env();
        assert!(matches!(result, Err(ConfigError::InvalidTimeout(ref v)) if v == "soon"));

        env::set_var("ESBAR_TIMEOUT_SECS", "7");
        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config.timeout(), Some(Duration::from_secs(7)));

        env::remove_var("ESBAR_TIMEOUT_SECS");
        assert!(ClientConfig::from_env().unwrap().timeout().is_none());
    }
}
