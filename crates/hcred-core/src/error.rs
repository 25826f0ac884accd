//! # Validation Errors
//!
//! Structured error types for domain primitive construction, built with
//! `thiserror`. Each variant carries the invalid input and the expected
//! format so that operators can diagnose misconfiguration without guesswork.

use thiserror::Error;

/// Validation errors for domain primitive newtypes.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Wallet address does not conform to the 0x-prefixed 40-hex-digit format.
    #[error("invalid wallet address: \"{0}\" (expected 0x followed by 40 hex digits)")]
    InvalidWalletAddress(String),

    /// Transaction hash does not conform to the 0x-prefixed 64-hex-digit format.
    #[error("invalid transaction hash: \"{0}\" (expected 0x followed by 64 hex digits)")]
    InvalidTxHash(String),

    /// Content identifier is empty or contains characters outside the
    /// base-encoded alphabet.
    #[error("invalid content identifier: \"{0}\" (expected non-empty base-encoded string)")]
    InvalidCid(String),

    /// Token identifier string could not be parsed as an unsigned integer.
    #[error("invalid token id: \"{value}\" ({reason})")]
    InvalidTokenId {
        /// The string that failed to parse.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Date string is not a valid ISO 8601 calendar date.
    #[error("invalid date: \"{value}\" ({reason})")]
    InvalidDate {
        /// The string that failed to parse.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wallet_address_display_carries_input() {
        let err = ValidationError::InvalidWalletAddress("0x12".to_string());
        let msg = format!("{err}");
        assert!(msg.contains("0x12"));
        assert!(msg.contains("40 hex digits"));
    }

    #[test]
    fn tx_hash_display_carries_input() {
        let err = ValidationError::InvalidTxHash("abc".to_string());
        assert!(format!("{err}").contains("abc"));
    }

    #[test]
    fn cid_display_carries_input() {
        let err = ValidationError::InvalidCid("".to_string());
        assert!(format!("{err}").contains("non-empty"));
    }

    #[test]
    fn token_id_display_carries_value_and_reason() {
        let err = ValidationError::InvalidTokenId {
            value: "-3".to_string(),
            reason: "negative".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("-3"));
        assert!(msg.contains("negative"));
    }

    #[test]
    fn date_display_carries_value_and_reason() {
        let err = ValidationError::InvalidDate {
            value: "not-a-date".to_string(),
            reason: "parse failed".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("not-a-date"));
        assert!(msg.contains("parse failed"));
    }

    #[test]
    fn all_variants_are_debug() {
        let e = ValidationError::InvalidCid("x".to_string());
        assert!(!format!("{e:?}").is_empty());
    }
}
