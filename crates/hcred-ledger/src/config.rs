//! Ledger client configuration.
//!
//! Configures the JSON-RPC endpoint, contract address, and sender identity.
//! Override via environment variables or explicit construction for
//! staging/testing.

use hcred_core::WalletAddress;
use url::Url;

/// Configuration for connecting to the credential ledger contract.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// JSON-RPC endpoint URL (must be HTTPS in production).
    pub rpc_url: Url,
    /// Address of the deployed credential ledger contract.
    pub contract_address: WalletAddress,
    /// Sender address whose transactions are signed by the RPC provider.
    /// Must be the contract owner for `revoke` to succeed.
    pub from_address: WalletAddress,
    /// EVM chain ID (e.g., 11155111 for Sepolia).
    pub chain_id: u64,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Milliseconds between `eth_getTransactionReceipt` polls.
    pub receipt_poll_interval_ms: u64,
    /// Maximum number of receipt polls before giving up on confirmation.
    pub receipt_poll_attempts: u32,
}

impl LedgerConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `LEDGER_RPC_URL` (required)
    /// - `LEDGER_CONTRACT_ADDRESS` (required)
    /// - `LEDGER_FROM_ADDRESS` (required)
    /// - `LEDGER_CHAIN_ID` (default: 11155111, Sepolia)
    /// - `LEDGER_TIMEOUT_SECS` (default: 30)
    /// - `LEDGER_RECEIPT_POLL_INTERVAL_MS` (default: 4000)
    /// - `LEDGER_RECEIPT_POLL_ATTEMPTS` (default: 45)
    pub fn from_env() -> Result<Self, ConfigError> {
        let rpc_url = required_url("LEDGER_RPC_URL")?;
        let contract_address = required_address("LEDGER_CONTRACT_ADDRESS")?;
        let from_address = required_address("LEDGER_FROM_ADDRESS")?;

        Ok(Self {
            rpc_url,
            contract_address,
            from_address,
            chain_id: env_u64("LEDGER_CHAIN_ID", 11_155_111),
            timeout_secs: env_u64("LEDGER_TIMEOUT_SECS", 30),
            receipt_poll_interval_ms: env_u64("LEDGER_RECEIPT_POLL_INTERVAL_MS", 4_000),
            receipt_poll_attempts: env_u64("LEDGER_RECEIPT_POLL_ATTEMPTS", 45) as u32,
        })
    }

    /// Create a configuration pointing to a local mock server (for testing).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if the localhost URL cannot be
    /// parsed (should not occur for valid port numbers, but avoids
    /// `expect()`).
    pub fn local_mock(
        rpc_url: &str,
        contract_address: &str,
        from_address: &str,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            rpc_url: Url::parse(rpc_url)
                .map_err(|e| ConfigError::InvalidUrl("rpc_url".into(), e.to_string()))?,
            contract_address: WalletAddress::new(contract_address)
                .map_err(|e| ConfigError::InvalidAddress("contract_address".into(), e.to_string()))?,
            from_address: WalletAddress::new(from_address)
                .map_err(|e| ConfigError::InvalidAddress("from_address".into(), e.to_string()))?,
            chain_id: 31_337,
            timeout_secs: 5,
            receipt_poll_interval_ms: 10,
            receipt_poll_attempts: 5,
        })
    }
}

fn required_url(var: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).map_err(|_| ConfigError::MissingVar(var.to_string()))?;
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

fn required_address(var: &str) -> Result<WalletAddress, ConfigError> {
    let raw = std::env::var(var).map_err(|_| ConfigError::MissingVar(var.to_string()))?;
    WalletAddress::new(&raw).map_err(|e| ConfigError::InvalidAddress(var.to_string(), e.to_string()))
}

fn env_u64(var: &str, default: u64) -> u64 {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is absent.
    #[error("{0} environment variable is required")]
    MissingVar(String),
    /// A URL-valued variable failed to parse.
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    /// An address-valued variable failed validation.
    #[error("invalid address for {0}: {1}")]
    InvalidAddress(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_mock_builds_valid_config() {
        let cfg = LedgerConfig::local_mock(
            "http://127.0.0.1:9100",
            "0x0000000000000000000000000000000000000001",
            "0x0000000000000000000000000000000000000002",
        )
        .unwrap();
        assert_eq!(cfg.rpc_url.as_str(), "http://127.0.0.1:9100/");
        assert_eq!(cfg.chain_id, 31_337);
        assert_eq!(cfg.timeout_secs, 5);
    }

    #[test]
    fn local_mock_canonicalizes_addresses() {
        let cfg = LedgerConfig::local_mock(
            "http://127.0.0.1:9100",
            "0xABCDEF0123456789abcdef0123456789ABCDEF01",
            "0x0000000000000000000000000000000000000002",
        )
        .unwrap();
        assert_eq!(
            cfg.contract_address.as_str(),
            "0xabcdef0123456789abcdef0123456789abcdef01"
        );
    }

    #[test]
    fn local_mock_rejects_bad_contract_address() {
        let result = LedgerConfig::local_mock(
            "http://127.0.0.1:9100",
            "not-an-address",
            "0x0000000000000000000000000000000000000002",
        );
        assert!(result.is_err());
    }

    #[test]
    fn from_env_reports_missing_rpc_url() {
        std::env::remove_var("LEDGER_RPC_URL");
        let result = LedgerConfig::from_env();
        assert!(matches!(result, Err(ConfigError::MissingVar(v)) if v == "LEDGER_RPC_URL"));
    }
}
