//! Configuration types for the worktask client

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable overriding the API base URL.
pub const BASE_URL_ENV: &str = "WORKTASK_API_BASE_URL";

const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_API_VERSION: &str = "/work-task/v1";

/// Main client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API origin, without the versioned path prefix.
    pub base_url: String,

    /// Versioned path prefix prepended to every endpoint.
    pub api_version: String,

    /// Timeout configuration
    pub timeouts: TimeoutConfig,

    /// Token lifetime configuration
    pub tokens: TokenConfig,

    /// Connection configuration
    pub connection: ConnectionConfig,
}

/// Timeout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Connection timeout
    #[serde(with = "duration_serde")]
    pub connect: Duration,

    /// Request timeout for individual calls
    #[serde(with = "duration_serde")]
    pub request: Duration,
}

/// Token lifetime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Access token lifetime in persistence.
    #[serde(with = "duration_serde")]
    pub access_ttl: Duration,

    /// Refresh token lifetime in persistence.
    #[serde(with = "duration_serde")]
    pub refresh_ttl: Duration,
}

/// Connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// User agent string
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeouts: TimeoutConfig::default(),
            tokens: TokenConfig::default(),
            connection: ConnectionConfig::default(),
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(10),
            request: Duration::from_secs(30),
        }
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            access_ttl: Duration::from_secs(60 * 60),
            refresh_ttl: Duration::from_secs(60 * 60 * 24 * 7),
        }
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            user_agent: Some(format!("worktask-client/{}", env!("CARGO_PKG_VERSION"))),
        }
    }
}

impl ClientConfig {
    /// Default configuration with the base URL taken from
    /// [`BASE_URL_ENV`] when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(base_url) = std::env::var(BASE_URL_ENV)
            && !base_url.is_empty()
        {
            config.base_url = base_url;
        }
        config
    }

    /// Default configuration pointed at `base_url`.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Endpoint path below the server origin, versioned prefix included.
    pub fn versioned_path(&self, endpoint: &str) -> String {
        format!("{}{}", self.api_version, endpoint)
    }
}

// Helper module for Duration serialization
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_api_contract() {
        let config = ClientConfig::default();
        assert_eq!(config.api_version, "/work-task/v1");
        assert_eq!(config.tokens.access_ttl, Duration::from_secs(3600));
        assert_eq!(config.tokens.refresh_ttl, Duration::from_secs(604_800));
    }

    #[test]
    fn versioned_path_prefixes_endpoints() {
        let config = ClientConfig::default();
        assert_eq!(config.versioned_path("/auth/login"), "/work-task/v1/auth/login");
    }

    #[test]
    fn config_serialization_round_trips() {
        let config = ClientConfig::with_base_url("https://api.example.com");
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: ClientConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.base_url, "https://api.example.com");
        assert_eq!(deserialized.timeouts.request, config.timeouts.request);
    }
}
