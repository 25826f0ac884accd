//! # hcred-ledger — Typed JSON-RPC client for the credential ledger contract
//!
//! Provides ergonomic, typed access to the health credential ledger — an
//! ERC-721-style contract on an EVM-compatible chain — via plain JSON-RPC
//! over HTTPS:
//!
//! - **Writes** (`mintTo`, `revoke`) go through `eth_sendTransaction`.
//!   Transaction signing is delegated to the RPC endpoint's key management
//!   (HSM, KMS, or unlocked account) — this crate does NOT hold private keys.
//! - **Reads** (`ownerOf`, `tokenURI`, `isRevoked`, `isExpired`) go through
//!   `eth_call` against the latest block and work on any public read-only
//!   endpoint, no signing identity required.
//! - **Confirmation** polls `eth_getTransactionReceipt` on a bounded
//!   interval/attempt budget from [`LedgerConfig`].
//!
//! ## Architecture
//!
//! This crate is the only path by which the healthcred stack touches chain
//! state. ABI encoding is hand-rolled for the six fixed contract operations
//! (see [`abi`]); the 4-byte selectors are precomputed constants, commented
//! with their keccak-256 preimages.

pub mod abi;
pub mod client;
pub mod config;
pub mod error;
pub mod receipt;
pub(crate) mod rpc;

pub use client::LedgerClient;
pub use config::LedgerConfig;
pub use error::LedgerError;
pub use receipt::{LogEntry, TransactionReceipt};
