//! Ledger client error taxonomy.
//!
//! Every failure mode of a chain interaction maps to a distinct variant so
//! that the orchestration layer can translate precisely: a user-declined
//! signature is recoverable, a revert carries its classified reason, and a
//! nonexistent token is distinguishable from transport failure.

use hcred_core::TokenId;
use thiserror::Error;

/// Errors from the credential ledger client.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Transport-level HTTP failure (connection refused, timeout, TLS).
    #[error("HTTP error calling {method}: {source}")]
    Http {
        /// The JSON-RPC method being called.
        method: String,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// The RPC endpoint returned a non-success HTTP status.
    #[error("ledger endpoint returned HTTP {status} for {method}")]
    Api {
        /// The JSON-RPC method being called.
        method: String,
        /// The HTTP status code.
        status: u16,
    },

    /// A JSON-RPC error object with no more specific classification.
    #[error("JSON-RPC error {code} for {method}: {message}")]
    Rpc {
        /// The JSON-RPC method being called.
        method: String,
        /// The JSON-RPC error code.
        code: i64,
        /// The JSON-RPC error message.
        message: String,
    },

    /// The caller's signer declined to sign the transaction
    /// (EIP-1193 error code 4001). Recoverable — no retry is attempted.
    #[error("signature request declined by the signing endpoint")]
    UserRejected,

    /// Execution reverted with a reason that matched no known contract error.
    #[error("ledger contract reverted: {reason}")]
    Revert {
        /// Decoded revert reason, or the raw RPC message when undecodable.
        reason: String,
    },

    /// The token id does not exist on the ledger
    /// (`ERC721NonexistentToken` revert).
    #[error("token {0} does not exist on the ledger")]
    TokenNotFound(TokenId),

    /// The sender is not the contract owner
    /// (`OwnableUnauthorizedAccount` revert).
    #[error("sender is not authorized for this ledger operation")]
    Unauthorized,

    /// The token is already revoked; the ledger rejects a second revocation.
    #[error("token {0} is already revoked")]
    AlreadyRevoked(TokenId),

    /// A transaction was mined but reverted on-chain (receipt status 0x0).
    #[error("transaction {tx_hash} reverted on-chain")]
    Reverted {
        /// The hash of the reverted transaction.
        tx_hash: String,
    },

    /// The receipt did not appear within the configured polling budget.
    #[error("transaction {tx_hash} not confirmed after {attempts} polls")]
    ConfirmationTimeout {
        /// The hash of the pending transaction.
        tx_hash: String,
        /// How many polls were made before giving up.
        attempts: u32,
    },

    /// A well-formed HTTP response could not be decoded as expected.
    #[error("failed to decode {method} response: {message}")]
    Deserialization {
        /// The JSON-RPC method being called.
        method: String,
        /// What was wrong with the payload.
        message: String,
    },
}
