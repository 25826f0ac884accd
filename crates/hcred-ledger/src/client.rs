//! Typed client for the credential ledger contract.
//!
//! Writes (`mint_to`, `revoke`) are submitted via `eth_sendTransaction` —
//! the RPC endpoint's managed signer signs on behalf of the configured
//! `from` address — then confirmed by polling `eth_getTransactionReceipt`
//! on the configured interval/attempt budget. Reads go through `eth_call`
//! against the latest block.

use std::time::Duration;

use serde_json::json;

use hcred_core::{TokenId, WalletAddress};

use crate::abi::{self, RevertKind};
use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::receipt::TransactionReceipt;
use crate::rpc::{RpcFailure, RpcTransport};

/// Client for the health credential ledger contract.
#[derive(Debug, Clone)]
pub struct LedgerClient {
    transport: RpcTransport,
    config: LedgerConfig,
}

impl LedgerClient {
    /// Create a new ledger client from configuration.
    pub fn new(config: LedgerConfig) -> Result<Self, LedgerError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LedgerError::Http {
                method: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            transport: RpcTransport::new(http, config.rpc_url.clone()),
            config,
        })
    }

    /// The address of the configured ledger contract.
    pub fn contract_address(&self) -> &WalletAddress {
        &self.config.contract_address
    }

    /// The sender address used for write transactions.
    pub fn from_address(&self) -> &WalletAddress {
        &self.config.from_address
    }

    // -- Writes ---------------------------------------------------------------

    /// Mint a new credential token to `owner` with the given metadata URI.
    ///
    /// Submits `mintTo(address,string)` and waits for on-chain confirmation.
    /// The returned receipt carries the logs from which the assigned token
    /// id is extracted via [`TransactionReceipt::minted_token_id`].
    pub async fn mint_to(
        &self,
        owner: &WalletAddress,
        uri: &str,
    ) -> Result<TransactionReceipt, LedgerError> {
        let data = abi::encode_mint_to(owner, uri);
        let tx_hash = self.send_transaction(data, "mintTo", None).await?;
        tracing::info!(%tx_hash, owner = %owner, "mint transaction submitted");
        self.wait_for_receipt(&tx_hash).await
    }

    /// Revoke the credential token. Owner-only on the contract side.
    ///
    /// An unauthorized sender surfaces as [`LedgerError::Unauthorized`]; a
    /// second revocation of the same token as [`LedgerError::AlreadyRevoked`].
    pub async fn revoke(&self, token_id: TokenId) -> Result<TransactionReceipt, LedgerError> {
        let data = abi::encode_token_id_call(abi::REVOKE_SELECTOR, token_id);
        let tx_hash = self
            .send_transaction(data, "revoke", Some(token_id))
            .await?;
        tracing::info!(%tx_hash, %token_id, "revoke transaction submitted");
        self.wait_for_receipt(&tx_hash).await
    }

    // -- Reads ----------------------------------------------------------------

    /// Current owner of the token. A never-minted token id yields
    /// [`LedgerError::TokenNotFound`].
    pub async fn owner_of(&self, token_id: TokenId) -> Result<WalletAddress, LedgerError> {
        let data = abi::encode_token_id_call(abi::OWNER_OF_SELECTOR, token_id);
        let result = self.eth_call(data, "ownerOf", Some(token_id)).await?;
        abi::decode_address(&result).map_err(|e| LedgerError::Deserialization {
            method: "ownerOf".into(),
            message: e.to_string(),
        })
    }

    /// Metadata URI bound to the token at mint time.
    pub async fn token_uri(&self, token_id: TokenId) -> Result<String, LedgerError> {
        let data = abi::encode_token_id_call(abi::TOKEN_URI_SELECTOR, token_id);
        let result = self.eth_call(data, "tokenURI", Some(token_id)).await?;
        abi::decode_string(&result).map_err(|e| LedgerError::Deserialization {
            method: "tokenURI".into(),
            message: e.to_string(),
        })
    }

    /// Whether the token has been revoked.
    pub async fn is_revoked(&self, token_id: TokenId) -> Result<bool, LedgerError> {
        let data = abi::encode_token_id_call(abi::IS_REVOKED_SELECTOR, token_id);
        let result = self.eth_call(data, "isRevoked", Some(token_id)).await?;
        abi::decode_bool(&result).map_err(|e| LedgerError::Deserialization {
            method: "isRevoked".into(),
            message: e.to_string(),
        })
    }

    /// Whether the token's on-chain expiry date has passed.
    pub async fn is_expired(&self, token_id: TokenId) -> Result<bool, LedgerError> {
        let data = abi::encode_token_id_call(abi::IS_EXPIRED_SELECTOR, token_id);
        let result = self.eth_call(data, "isExpired", Some(token_id)).await?;
        abi::decode_bool(&result).map_err(|e| LedgerError::Deserialization {
            method: "isExpired".into(),
            message: e.to_string(),
        })
    }

    // -- Plumbing -------------------------------------------------------------

    /// Submit a write transaction and return its hash.
    async fn send_transaction(
        &self,
        data: String,
        method_label: &str,
        token_id: Option<TokenId>,
    ) -> Result<String, LedgerError> {
        let tx = json!({
            "from": self.config.from_address.as_str(),
            "to": self.config.contract_address.as_str(),
            "data": data,
        });

        let result = self
            .transport
            .call("eth_sendTransaction", json!([tx]))
            .await
            .map_err(|f| self.map_failure(method_label, f, token_id))?;

        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| LedgerError::Deserialization {
                method: method_label.into(),
                message: "eth_sendTransaction returned non-string result".into(),
            })
    }

    /// Poll for the transaction receipt until mined or the budget is spent.
    ///
    /// A mined-but-reverted transaction (receipt status `0x0`) is an error:
    /// the chain rejected the state change even though a receipt exists.
    pub async fn wait_for_receipt(
        &self,
        tx_hash: &str,
    ) -> Result<TransactionReceipt, LedgerError> {
        for attempt in 0..self.config.receipt_poll_attempts {
            if attempt > 0 {
                tokio::time::sleep(Duration::from_millis(self.config.receipt_poll_interval_ms))
                    .await;
            }

            let result = self
                .transport
                .call("eth_getTransactionReceipt", json!([tx_hash]))
                .await
                .map_err(|f| self.map_failure("eth_getTransactionReceipt", f, None))?;

            if result.is_null() {
                tracing::debug!(%tx_hash, attempt, "transaction pending");
                continue;
            }

            let receipt: TransactionReceipt =
                serde_json::from_value(result).map_err(|e| LedgerError::Deserialization {
                    method: "eth_getTransactionReceipt".into(),
                    message: e.to_string(),
                })?;

            if !receipt.succeeded() {
                return Err(LedgerError::Reverted {
                    tx_hash: tx_hash.to_string(),
                });
            }
            return Ok(receipt);
        }

        Err(LedgerError::ConfirmationTimeout {
            tx_hash: tx_hash.to_string(),
            attempts: self.config.receipt_poll_attempts,
        })
    }

    /// Issue a read-only `eth_call` against the latest block.
    async fn eth_call(
        &self,
        data: String,
        method_label: &str,
        token_id: Option<TokenId>,
    ) -> Result<String, LedgerError> {
        let call = json!({
            "to": self.config.contract_address.as_str(),
            "data": data,
        });

        let result = self
            .transport
            .call("eth_call", json!([call, "latest"]))
            .await
            .map_err(|f| self.map_failure(method_label, f, token_id))?;

        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| LedgerError::Deserialization {
                method: method_label.into(),
                message: "eth_call returned non-string result".into(),
            })
    }

    /// Translate a transport failure into the ledger error taxonomy.
    ///
    /// EIP-1193 code 4001 is a declined signature request. JSON-RPC code 3
    /// (and any message mentioning a revert) is an execution revert, which
    /// is further classified from its data payload: nonexistent token,
    /// unauthorized sender, already-revoked, or other.
    fn map_failure(
        &self,
        method: &str,
        failure: RpcFailure,
        token_id: Option<TokenId>,
    ) -> LedgerError {
        match failure {
            RpcFailure::Http(source) => LedgerError::Http {
                method: method.into(),
                source,
            },
            RpcFailure::Status(status) => LedgerError::Api {
                method: method.into(),
                status,
            },
            RpcFailure::InvalidJson(e) => LedgerError::Deserialization {
                method: method.into(),
                message: e.to_string(),
            },
            RpcFailure::MissingResult => LedgerError::Deserialization {
                method: method.into(),
                message: "JSON-RPC response missing 'result' field".into(),
            },
            RpcFailure::ErrorObject {
                code: 4001,
                ..
            } => LedgerError::UserRejected,
            RpcFailure::ErrorObject {
                code,
                message,
                data,
            } => {
                let looks_like_revert =
                    code == 3 || message.to_lowercase().contains("revert") || data.is_some();
                if !looks_like_revert {
                    return LedgerError::Rpc {
                        method: method.into(),
                        code,
                        message,
                    };
                }
                match abi::classify_revert(data.as_deref(), &message) {
                    RevertKind::NonexistentToken => match token_id {
                        Some(id) => LedgerError::TokenNotFound(id),
                        None => LedgerError::Revert { reason: message },
                    },
                    RevertKind::UnauthorizedAccount => LedgerError::Unauthorized,
                    RevertKind::Other(reason) => {
                        if reason.to_lowercase().contains("already revoked") {
                            match token_id {
                                Some(id) => LedgerError::AlreadyRevoked(id),
                                None => LedgerError::Revert { reason },
                            }
                        } else {
                            LedgerError::Revert { reason }
                        }
                    }
                }
            }
        }
    }
}
