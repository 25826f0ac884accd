//! The credential metadata document.
//!
//! Published to the content-addressed network at issuance time and fetched
//! back during verification. Immutable by construction — republishing a
//! changed document produces a new content identifier, so the token URI
//! recorded on-chain always names exactly the bytes minted against.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use hcred_core::{Cid, WalletAddress};

/// The JSON document describing one issued credential.
///
/// Field names serialize in camelCase to match the wire format consumed by
/// verifiers. `deny_unknown_fields` is intentionally NOT used — gateway
/// retrieval must tolerate documents written by newer service versions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialMetadata {
    /// Document title, e.g. "COVID-19 Vaccination".
    pub title: String,
    /// Issuing hospital's display name.
    pub issuer: String,
    /// Date the credential was issued.
    pub issued_date: NaiveDate,
    /// Free-text notes about the document.
    #[serde(default)]
    pub description: String,
    /// Optional expiry date. Absent means the credential never expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
    /// MIME type of the underlying document file.
    pub mime_type: String,
    /// `ipfs://` URI of the underlying document file.
    pub ipfs_file_url: String,
    /// Content identifier of the underlying document file.
    pub file_cid: Cid,
    /// Canonical wallet address of the credential holder.
    pub owner_wallet: WalletAddress,
}
