//! Minimal ABI encoding/decoding for the credential ledger contract.
//!
//! The contract surface is six fixed operations, so the full ABI machinery
//! of a general-purpose chain SDK is not needed. Selectors are precomputed
//! constants (first 4 bytes of keccak-256 of the canonical signature),
//! following the convention of hardcoding well-known selectors rather than
//! computing them at runtime.
//!
//! ## Contract interface
//!
//! ```solidity
//! function mintTo(address to, string uri) external returns (uint256);
//! function revoke(uint256 tokenId) external;
//! function isRevoked(uint256 tokenId) external view returns (bool);
//! function isExpired(uint256 tokenId) external view returns (bool);
//! function ownerOf(uint256 tokenId) external view returns (address);
//! function tokenURI(uint256 tokenId) external view returns (string);
//! event Transfer(address indexed from, address indexed to, uint256 indexed tokenId);
//! ```

use hcred_core::{TokenId, WalletAddress};

/// keccak256("mintTo(address,string)")[..4]
pub const MINT_TO_SELECTOR: &str = "0075a317";
/// keccak256("revoke(uint256)")[..4]
pub const REVOKE_SELECTOR: &str = "20c5429b";
/// keccak256("isRevoked(uint256)")[..4]
pub const IS_REVOKED_SELECTOR: &str = "5ccc561e";
/// keccak256("isExpired(uint256)")[..4]
pub const IS_EXPIRED_SELECTOR: &str = "d9548e53";
/// keccak256("ownerOf(uint256)")[..4]
pub const OWNER_OF_SELECTOR: &str = "6352211e";
/// keccak256("tokenURI(uint256)")[..4]
pub const TOKEN_URI_SELECTOR: &str = "c87b56dd";

/// keccak256("Transfer(address,address,uint256)") — topic 0 of the ERC-721
/// Transfer event.
pub const TRANSFER_TOPIC: &str =
    "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";

/// keccak256("Error(string)")[..4] — the standard revert-reason wrapper.
pub const ERROR_STRING_SELECTOR: &str = "08c379a0";
/// keccak256("ERC721NonexistentToken(uint256)")[..4]
pub const NONEXISTENT_TOKEN_SELECTOR: &str = "7e273289";
/// keccak256("OwnableUnauthorizedAccount(address)")[..4]
pub const UNAUTHORIZED_ACCOUNT_SELECTOR: &str = "118cdaa7";

/// ABI decoding failures. Converted to `LedgerError::Deserialization` at the
/// client boundary, where the method name is known.
#[derive(Debug, PartialEq, Eq)]
pub struct AbiError(pub String);

impl std::fmt::Display for AbiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode `mintTo(address,string)` calldata.
///
/// Layout: selector, address word, offset word (0x40), string length word,
/// string bytes right-padded to a 32-byte boundary.
pub fn encode_mint_to(owner: &WalletAddress, uri: &str) -> String {
    let mut data = String::with_capacity(10 + 64 * 3 + uri.len() * 2);
    data.push_str("0x");
    data.push_str(MINT_TO_SELECTOR);
    data.push_str(&address_word(owner));
    data.push_str(&uint_word(0x40));
    data.push_str(&uint_word(uri.len() as u64));
    data.push_str(&padded_bytes(uri.as_bytes()));
    data
}

/// Encode calldata for a single-`uint256`-argument function.
pub fn encode_token_id_call(selector: &str, token_id: TokenId) -> String {
    format!("0x{selector}{}", uint_word(token_id.value()))
}

/// A 32-byte word holding a left-padded address.
fn address_word(addr: &WalletAddress) -> String {
    format!("{:0>64}", &addr.as_str()[2..])
}

/// A 32-byte word holding a left-padded unsigned integer.
fn uint_word(value: u64) -> String {
    format!("{value:064x}")
}

/// Bytes as hex, right-padded with zeros to a 32-byte boundary.
fn padded_bytes(bytes: &[u8]) -> String {
    let mut hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    let rem = hex.len() % 64;
    if rem != 0 {
        hex.extend(std::iter::repeat('0').take(64 - rem));
    }
    hex
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Strip an optional `0x` prefix.
pub fn strip_0x(hex: &str) -> &str {
    hex.strip_prefix("0x").unwrap_or(hex)
}

/// Decode a single `bool` return word. Any nonzero word is `true`.
pub fn decode_bool(result: &str) -> Result<bool, AbiError> {
    let hex = strip_0x(result);
    if hex.len() != 64 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(AbiError(format!(
            "expected one 32-byte word for bool, got {} hex chars",
            hex.len()
        )));
    }
    Ok(hex.chars().any(|c| c != '0'))
}

/// Decode a single `address` return word.
pub fn decode_address(result: &str) -> Result<WalletAddress, AbiError> {
    let hex = strip_0x(result);
    if hex.len() != 64 {
        return Err(AbiError(format!(
            "expected one 32-byte word for address, got {} hex chars",
            hex.len()
        )));
    }
    WalletAddress::new(format!("0x{}", &hex[24..]))
        .map_err(|e| AbiError(format!("invalid address word: {e}")))
}

/// Decode a single dynamic `string` return value (offset, length, bytes).
pub fn decode_string(result: &str) -> Result<String, AbiError> {
    let hex = strip_0x(result);
    let offset = word_as_usize(hex, 0)?;
    let len_pos = offset
        .checked_mul(2)
        .ok_or_else(|| AbiError("string offset overflow".into()))?;
    let len = word_at(hex, len_pos).and_then(hex_word_to_u64)? as usize;
    let data_start = len_pos + 64;
    let data_end = data_start
        .checked_add(len * 2)
        .ok_or_else(|| AbiError("string length overflow".into()))?;
    if hex.len() < data_end {
        return Err(AbiError(format!(
            "string data truncated: need {data_end} hex chars, have {}",
            hex.len()
        )));
    }
    let bytes = hex_to_bytes(&hex[data_start..data_end])?;
    String::from_utf8(bytes).map_err(|e| AbiError(format!("string is not UTF-8: {e}")))
}

/// Decode a `uint256` word into a `u64`, rejecting values that do not fit.
pub fn hex_word_to_u64(word: &str) -> Result<u64, AbiError> {
    let trimmed = word.trim_start_matches('0');
    if trimmed.len() > 16 {
        return Err(AbiError(format!("uint word exceeds u64 range: {word}")));
    }
    if trimmed.is_empty() {
        return Ok(0);
    }
    u64::from_str_radix(trimmed, 16).map_err(|e| AbiError(format!("invalid uint word: {e}")))
}

/// Extract the token id from a `Transfer` event's indexed topic.
pub fn topic_to_token_id(topic: &str) -> Result<TokenId, AbiError> {
    let hex = strip_0x(topic);
    if hex.len() != 64 {
        return Err(AbiError(format!(
            "expected 32-byte topic, got {} hex chars",
            hex.len()
        )));
    }
    hex_word_to_u64(hex).map(TokenId::new)
}

fn word_as_usize(hex: &str, pos: usize) -> Result<usize, AbiError> {
    word_at(hex, pos)
        .and_then(hex_word_to_u64)
        .map(|v| v as usize)
}

fn word_at(hex: &str, pos: usize) -> Result<&str, AbiError> {
    hex.get(pos..pos + 64)
        .ok_or_else(|| AbiError(format!("missing 32-byte word at hex offset {pos}")))
}

fn hex_to_bytes(hex: &str) -> Result<Vec<u8>, AbiError> {
    if hex.len() % 2 != 0 {
        return Err(AbiError(format!("hex string has odd length: {}", hex.len())));
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| AbiError(format!("invalid hex at position {i}: {e}")))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Revert classification
// ---------------------------------------------------------------------------

/// Classified cause of an execution revert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevertKind {
    /// `ERC721NonexistentToken(uint256)` — the token id was never minted.
    NonexistentToken,
    /// `OwnableUnauthorizedAccount(address)` — the sender is not the owner.
    UnauthorizedAccount,
    /// Any other revert, with the best reason string available.
    Other(String),
}

/// Classify a revert from its RPC error `data` payload and message.
///
/// Recognizes the contract's custom error selectors first; falls back to
/// decoding the standard `Error(string)` wrapper, then to matching the
/// error name in the RPC message (some providers decode custom errors into
/// the message text instead of returning raw data).
pub fn classify_revert(data: Option<&str>, message: &str) -> RevertKind {
    if let Some(data) = data {
        let hex = strip_0x(data);
        if hex.len() >= 8 {
            match &hex[..8] {
                s if s == NONEXISTENT_TOKEN_SELECTOR => return RevertKind::NonexistentToken,
                s if s == UNAUTHORIZED_ACCOUNT_SELECTOR => return RevertKind::UnauthorizedAccount,
                s if s == ERROR_STRING_SELECTOR => {
                    if let Ok(reason) = decode_string(&hex[8..]) {
                        return RevertKind::Other(reason);
                    }
                }
                _ => {}
            }
        }
    }
    if message.contains("ERC721NonexistentToken") {
        return RevertKind::NonexistentToken;
    }
    if message.contains("OwnableUnauthorizedAccount") {
        return RevertKind::UnauthorizedAccount;
    }
    RevertKind::Other(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(hex40: &str) -> WalletAddress {
        WalletAddress::new(format!("0x{hex40}")).unwrap()
    }

    #[test]
    fn selectors_are_4_bytes() {
        for s in [
            MINT_TO_SELECTOR,
            REVOKE_SELECTOR,
            IS_REVOKED_SELECTOR,
            IS_EXPIRED_SELECTOR,
            OWNER_OF_SELECTOR,
            TOKEN_URI_SELECTOR,
        ] {
            assert_eq!(s.len(), 8);
            assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn encode_mint_to_layout() {
        let owner = addr("00000000000000000000000000000000000000aa");
        let data = encode_mint_to(&owner, "ipfs://QmX");
        // 0x + selector + 3 head/len words + 1 padded data word
        assert_eq!(data.len(), 2 + 8 + 64 * 4);
        assert!(data.starts_with("0x0075a317"));
        // Address word: left-padded.
        assert_eq!(&data[10..74], &format!("{:0>64}", "aa"));
        // Offset word: 0x40.
        assert_eq!(&data[74..138], &format!("{:064x}", 0x40));
        // Length word: 10 bytes.
        assert_eq!(&data[138..202], &format!("{:064x}", 10));
        // Data word: "ipfs://QmX" hex, right-padded.
        let expected: String = "ipfs://QmX".bytes().map(|b| format!("{b:02x}")).collect();
        assert!(data[202..].starts_with(&expected));
        assert!(data[202 + expected.len()..].chars().all(|c| c == '0'));
    }

    #[test]
    fn encode_mint_to_exact_32_byte_uri_adds_no_padding() {
        let owner = addr("00000000000000000000000000000000000000aa");
        let uri = "a".repeat(32);
        let data = encode_mint_to(&owner, &uri);
        assert_eq!(data.len(), 2 + 8 + 64 * 4);
    }

    #[test]
    fn encode_token_id_call_layout() {
        let data = encode_token_id_call(OWNER_OF_SELECTOR, TokenId::new(5));
        assert_eq!(data, format!("0x6352211e{:064x}", 5));
    }

    #[test]
    fn decode_bool_true_and_false() {
        assert!(decode_bool(&format!("0x{:064x}", 1)).unwrap());
        assert!(!decode_bool(&format!("0x{:064x}", 0)).unwrap());
    }

    #[test]
    fn decode_bool_rejects_wrong_width() {
        assert!(decode_bool("0x01").is_err());
    }

    #[test]
    fn decode_address_word() {
        let word = format!("{:0>64}", "deadbeefdeadbeefdeadbeefdeadbeefdeadbeef");
        let decoded = decode_address(&format!("0x{word}")).unwrap();
        assert_eq!(decoded.as_str(), "0xdeadbeefdeadbeefdeadbeefdeadbeefdeadbeef");
    }

    #[test]
    fn decode_string_roundtrip() {
        let uri = "ipfs://QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG";
        // Hand-build: offset word (0x20), length word, padded data.
        let mut hex = String::from("0x");
        hex.push_str(&format!("{:064x}", 0x20));
        hex.push_str(&format!("{:064x}", uri.len()));
        hex.push_str(&padded_bytes(uri.as_bytes()));
        assert_eq!(decode_string(&hex).unwrap(), uri);
    }

    #[test]
    fn decode_string_rejects_truncated_data() {
        let mut hex = String::from("0x");
        hex.push_str(&format!("{:064x}", 0x20));
        hex.push_str(&format!("{:064x}", 99));
        hex.push_str(&padded_bytes(b"short"));
        assert!(decode_string(&hex).is_err());
    }

    #[test]
    fn topic_to_token_id_parses() {
        let topic = format!("0x{:064x}", 1234);
        assert_eq!(topic_to_token_id(&topic).unwrap(), TokenId::new(1234));
    }

    #[test]
    fn topic_to_token_id_rejects_oversized_value() {
        let topic = format!("0x{}", "f".repeat(64));
        assert!(topic_to_token_id(&topic).is_err());
    }

    #[test]
    fn hex_word_to_u64_zero() {
        assert_eq!(hex_word_to_u64(&"0".repeat(64)).unwrap(), 0);
    }

    #[test]
    fn classify_revert_nonexistent_token_by_selector() {
        let data = format!("0x{NONEXISTENT_TOKEN_SELECTOR}{:064x}", 7);
        assert_eq!(
            classify_revert(Some(&data), "execution reverted"),
            RevertKind::NonexistentToken
        );
    }

    #[test]
    fn classify_revert_unauthorized_by_selector() {
        let data = format!("0x{UNAUTHORIZED_ACCOUNT_SELECTOR}{:0>64}", "aa");
        assert_eq!(
            classify_revert(Some(&data), "execution reverted"),
            RevertKind::UnauthorizedAccount
        );
    }

    #[test]
    fn classify_revert_error_string() {
        let reason = "Credential already revoked";
        let mut data = format!("0x{ERROR_STRING_SELECTOR}");
        data.push_str(&format!("{:064x}", 0x20));
        data.push_str(&format!("{:064x}", reason.len()));
        data.push_str(&padded_bytes(reason.as_bytes()));
        assert_eq!(
            classify_revert(Some(&data), "execution reverted"),
            RevertKind::Other(reason.to_string())
        );
    }

    #[test]
    fn classify_revert_falls_back_to_message_text() {
        assert_eq!(
            classify_revert(None, "execution reverted: ERC721NonexistentToken(5)"),
            RevertKind::NonexistentToken
        );
        assert_eq!(
            classify_revert(None, "execution reverted: OwnableUnauthorizedAccount(0xaa)"),
            RevertKind::UnauthorizedAccount
        );
    }

    #[test]
    fn classify_revert_other_keeps_message() {
        let kind = classify_revert(None, "execution reverted: paused");
        assert_eq!(kind, RevertKind::Other("execution reverted: paused".into()));
    }
}
