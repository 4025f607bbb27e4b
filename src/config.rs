//! Client configuration

use crate::constants::{BASE_API_URL, REQUEST_TIMEOUT_SECS, USER_AGENT};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Network settings for the market data client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Absolute base URL every endpoint is resolved against
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// User agent sent with every request
    pub user_agent: String,
}

impl ClientConfig {
    /// Creates a config pointing at a different base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_API_URL.to_string(),
            timeout_secs: REQUEST_TIMEOUT_SECS,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_points_at_exchange() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, BASE_API_URL);
        assert_eq!(config.timeout(), Duration::from_secs(REQUEST_TIMEOUT_SECS));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"base_url":"http://localhost:8080"}"#).unwrap();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.user_agent, USER_AGENT);
        assert_eq!(config.timeout_secs, REQUEST_TIMEOUT_SECS);
    }
}
