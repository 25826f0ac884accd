#![deny(missing_docs)]

//! # hcred-core — Foundational Types for the Healthcred Stack
//!
//! This crate defines the types that every other crate in the workspace
//! depends on. It has no internal crate dependencies — only `serde`,
//! `serde_json`, `thiserror`, `chrono`, and `uuid` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** Every identifier is a
//!    distinct type. You cannot pass a [`RecordId`] where a [`ProfileId`] is
//!    expected, and a [`TokenId`] is not just a bare integer.
//!
//! 2. **Canonicalization at construction time.** [`WalletAddress`] and
//!    [`TxHash`] trim and lowercase their input before validating, so every
//!    value that exists is already in canonical form. Canonicalization is
//!    idempotent by construction.
//!
//! 3. **[`ValidationError`] hierarchy.** Structured errors with `thiserror` —
//!    no `Box<dyn Error>`, no `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod temporal;

// Re-export primary types at crate root for ergonomic imports.
pub use error::ValidationError;
pub use identity::{Cid, ProfileId, RecordId, TokenId, TxHash, WalletAddress};
pub use temporal::{is_expired, is_expired_on};
