//! # Identity Newtypes
//!
//! Domain-primitive newtypes for identifiers throughout the healthcred
//! stack. Each identifier is a distinct type — you cannot pass a
//! [`RecordId`] where a [`ProfileId`] is expected.
//!
//! ## Validation
//!
//! String-based identifiers ([`WalletAddress`], [`TxHash`], [`Cid`]) validate
//! format at construction time. UUID-based identifiers ([`RecordId`],
//! [`ProfileId`]) are always valid by construction. [`TokenId`] wraps the
//! unsigned integer assigned by the ledger contract.
//!
//! ## Canonical forms
//!
//! - Wallet addresses: trimmed, lowercased, `0x` + 40 hex digits.
//! - Transaction hashes: trimmed, lowercased, `0x` + 64 hex digits.
//!
//! Because the constructor canonicalizes before storing, feeding a canonical
//! value back through the constructor is a no-op.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

// ---------------------------------------------------------------------------
// UUID-based identifiers (always valid by construction)
// ---------------------------------------------------------------------------

/// A unique identifier for a persisted credential record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Create a new random record identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a record identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unique identifier for a patient or hospital profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProfileId(Uuid);

impl ProfileId {
    /// Create a new random profile identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a profile identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ProfileId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ProfileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Ledger-assigned identifiers
// ---------------------------------------------------------------------------

/// The numeric token identifier assigned by the ledger contract at mint time.
///
/// Immutable once minted — the ledger guarantees uniqueness per contract.
/// Serializes as a plain unsigned integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(u64);

impl TokenId {
    /// Wrap a ledger-assigned token number.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Access the underlying token number.
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Parse a token identifier from a decimal string.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidTokenId`] if the string is not a
    /// non-negative decimal integer within `u64` range.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let trimmed = value.trim();
        trimmed
            .parse::<u64>()
            .map(Self)
            .map_err(|e| ValidationError::InvalidTokenId {
                value: value.to_string(),
                reason: e.to_string(),
            })
    }
}

impl std::fmt::Display for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TokenId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

// ---------------------------------------------------------------------------
// String-based identifiers (canonicalized and validated at construction)
// ---------------------------------------------------------------------------

/// An EVM-style chain account address.
///
/// Canonical storage form: trimmed, lowercased, `0x` + 40 hex digits.
/// The constructor accepts mixed-case (checksummed) input and canonicalizes
/// it, so two addresses differing only in case compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Create a wallet address, canonicalizing (trim + lowercase) before
    /// validating the `0x` + 40-hex-digit format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidWalletAddress`] if the canonical
    /// form is not a well-formed address.
    pub fn new(value: impl AsRef<str>) -> Result<Self, ValidationError> {
        let canonical = Self::canonicalize(value.as_ref());
        if !Self::is_well_formed(&canonical) {
            return Err(ValidationError::InvalidWalletAddress(
                value.as_ref().to_string(),
            ));
        }
        Ok(Self(canonical))
    }

    /// Canonicalize an address string: trim surrounding whitespace and
    /// lowercase. Idempotent — canonicalizing a canonical value is a no-op.
    pub fn canonicalize(raw: &str) -> String {
        raw.trim().to_lowercase()
    }

    /// Whether a string is a well-formed address (`0x` + 40 hex digits).
    pub fn is_well_formed(addr: &str) -> bool {
        addr.len() == 42
            && addr.starts_with("0x")
            && addr[2..].chars().all(|c| c.is_ascii_hexdigit())
    }

    /// Access the canonical address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Truncated display form for logs and listings: `0x1234…abcd`.
    pub fn truncated(&self) -> String {
        format!("{}…{}", &self.0[..6], &self.0[38..])
    }
}

impl std::fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A chain transaction hash.
///
/// Canonical storage form: trimmed, lowercased, `0x` + 64 hex digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(String);

impl TxHash {
    /// Create a transaction hash, canonicalizing before validation.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidTxHash`] if the canonical form is
    /// not `0x` followed by 64 hex digits.
    pub fn new(value: impl AsRef<str>) -> Result<Self, ValidationError> {
        let canonical = value.as_ref().trim().to_lowercase();
        let well_formed = canonical.len() == 66
            && canonical.starts_with("0x")
            && canonical[2..].chars().all(|c| c.is_ascii_hexdigit());
        if !well_formed {
            return Err(ValidationError::InvalidTxHash(value.as_ref().to_string()));
        }
        Ok(Self(canonical))
    }

    /// Access the canonical hash string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TxHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A content identifier on the content-addressed storage network.
///
/// Validation is intentionally lenient — CIDv0 (`Qm…`, base58) and CIDv1
/// (`b…`, base32) are both accepted. The constructor only rejects empty
/// strings and characters outside the base-encoded alphabets; full
/// multiformat parsing belongs to the storage network, not this stack.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cid(String);

impl Cid {
    /// Create a content identifier, validating basic shape.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidCid`] if the string is empty or
    /// contains non-alphanumeric characters.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ValidationError::InvalidCid(s));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Access the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Cid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
