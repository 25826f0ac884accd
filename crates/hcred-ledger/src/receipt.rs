//! Transaction receipt types and Transfer-event token extraction.

use serde::Deserialize;

use hcred_core::{TokenId, TxHash, WalletAddress};

use crate::abi;

/// A log entry from a transaction receipt, as returned by
/// `eth_getTransactionReceipt`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Address of the contract that emitted the log.
    pub address: String,
    /// Indexed topics (topic 0 is the event signature hash).
    #[serde(default)]
    pub topics: Vec<String>,
    /// Non-indexed data payload.
    #[serde(default)]
    pub data: String,
}

/// A mined transaction receipt.
///
/// Fields use `#[serde(default)]` for resilience across RPC providers —
/// only the fields this stack consumes are modeled, and unknown fields are
/// ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    /// Hash of the mined transaction.
    pub transaction_hash: String,
    /// Execution status: `0x1` success, `0x0` reverted.
    #[serde(default)]
    pub status: Option<String>,
    /// Block the transaction was mined in (hex).
    #[serde(default)]
    pub block_number: Option<String>,
    /// Gas consumed by the transaction (hex).
    #[serde(default)]
    pub gas_used: Option<String>,
    /// Effective gas price paid (hex).
    #[serde(default)]
    pub effective_gas_price: Option<String>,
    /// Logs emitted during execution.
    #[serde(default)]
    pub logs: Vec<LogEntry>,
}

impl TransactionReceipt {
    /// Whether the transaction executed successfully (`status == 0x1`).
    pub fn succeeded(&self) -> bool {
        matches!(self.status.as_deref(), Some("0x1"))
    }

    /// The canonical transaction hash.
    pub fn tx_hash(&self) -> Result<TxHash, hcred_core::ValidationError> {
        TxHash::new(&self.transaction_hash)
    }

    /// Gas used, decoded from hex.
    pub fn gas_used_value(&self) -> Option<u64> {
        self.gas_used.as_deref().and_then(parse_hex_quantity)
    }

    /// Effective gas price, decoded from hex.
    pub fn gas_price_value(&self) -> Option<u64> {
        self.effective_gas_price
            .as_deref()
            .and_then(parse_hex_quantity)
    }

    /// Extract the minted token id from this receipt's logs.
    ///
    /// Scans for a `Transfer(address,address,uint256)` event emitted by the
    /// ledger contract address (compared in canonical lowercase form) and
    /// parses the token id from the third indexed topic. Returns `None`
    /// when no matching log exists — the caller must surface that loudly,
    /// since a mint succeeded on-chain but cannot be reconciled.
    pub fn minted_token_id(&self, contract: &WalletAddress) -> Option<TokenId> {
        self.logs
            .iter()
            .filter(|log| {
                WalletAddress::canonicalize(&log.address) == contract.as_str()
                    && log.topics.first().map(|t| t.as_str()) == Some(abi::TRANSFER_TOPIC)
                    && log.topics.len() == 4
            })
            .find_map(|log| abi::topic_to_token_id(&log.topics[3]).ok())
    }
}

/// Parse a JSON-RPC hex quantity (`0x`-prefixed, no leading zeros required).
fn parse_hex_quantity(hex: &str) -> Option<u64> {
    u64::from_str_radix(abi::strip_0x(hex), 16).ok()
}
