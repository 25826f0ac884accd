//! Pinning service configuration.
//!
//! Defaults point at the public pinning service and gateway. Override via
//! environment variables or explicit construction for staging/testing.

use url::Url;
use zeroize::Zeroizing;

/// Configuration for the pinning service and gateway.
///
/// Custom `Debug` implementation redacts the `api_token` field to prevent
/// credential leakage in log output.
#[derive(Clone)]
pub struct PinConfig {
    /// Base URL of the pinning service.
    pub pin_service_url: Url,
    /// Gateway base URL used to resolve `ipfs://` URIs for HTTP retrieval.
    /// Must end with a trailing path segment separator, e.g.
    /// `https://gateway.pinata.cloud/ipfs/`.
    pub gateway_url: Url,
    /// Bearer token (JWT) for pinning service authentication.
    pub api_token: Zeroizing<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for PinConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinConfig")
            .field("pin_service_url", &self.pin_service_url)
            .field("gateway_url", &self.gateway_url)
            .field("api_token", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl PinConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `PIN_SERVICE_URL` (default: `https://api.pinata.cloud`)
    /// - `IPFS_GATEWAY_URL` (default: `https://gateway.pinata.cloud/ipfs/`)
    /// - `PIN_API_TOKEN` (required)
    /// - `PIN_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_token = std::env::var("PIN_API_TOKEN").map_err(|_| ConfigError::MissingToken)?;

        Ok(Self {
            pin_service_url: env_url("PIN_SERVICE_URL", "https://api.pinata.cloud")?,
            gateway_url: env_url("IPFS_GATEWAY_URL", "https://gateway.pinata.cloud/ipfs/")?,
            api_token: Zeroizing::new(api_token),
            timeout_secs: std::env::var("PIN_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        })
    }

    /// Create a configuration pointing at a local mock server (for testing).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if the mock URL cannot be parsed.
    pub fn local_mock(base_url: &str, token: &str) -> Result<Self, ConfigError> {
        let parse = |label: &str, raw: &str| {
            Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(label.to_string(), e.to_string()))
        };
        Ok(Self {
            pin_service_url: parse("pin_service_url", base_url)?,
            gateway_url: parse("gateway_url", &format!("{}/ipfs/", base_url.trim_end_matches('/')))?,
            api_token: Zeroizing::new(token.to_string()),
            timeout_secs: 5,
        })
    }
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `PIN_API_TOKEN` was absent from the environment.
    #[error("PIN_API_TOKEN environment variable is required")]
    MissingToken,
    /// A URL-valued variable failed to parse.
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
}
