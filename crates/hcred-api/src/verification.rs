//! # Status/Verification Resolver
//!
//! Given a token id, queries the four independent ledger reads
//! concurrently, fetches the linked metadata document, and produces a
//! unified verdict. The resolver is read-only and side-effect-free: it is
//! reachable by unauthenticated callers over a public read-only chain
//! endpoint, and never touches the record store.
//!
//! Reconciliation of stored records against live chain state is a separate,
//! authenticated operation ([`refresh_record`]) so the public path stays
//! pure.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use hcred_core::{TokenId, WalletAddress};
use hcred_ipfs::{CredentialMetadata, PinClient, PinError};
use hcred_ledger::{LedgerClient, LedgerError};

use crate::state::{AppState, CredentialRecord};

/// Unified status verdict for a credential token.
///
/// Precedence: a revoked-and-expired token reports `Revoked` — revocation
/// is the stronger statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// The token exists, is not revoked, and is not expired.
    Active,
    /// The token has been revoked by the contract owner.
    Revoked,
    /// The token's on-chain expiry date has passed (and it is not revoked).
    Expired,
    /// The token could not be verified; see the diagnostic.
    Invalid,
}

/// The resolver's full answer for one token id.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerificationReport {
    /// The queried token id.
    #[schema(value_type = u64)]
    pub token_id: TokenId,
    /// The unified verdict.
    pub verdict: Verdict,
    /// Current owner address, when the token exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub owner: Option<WalletAddress>,
    /// Whether the ledger reports the token revoked.
    #[serde(default)]
    pub revoked: bool,
    /// Whether the ledger reports the token expired.
    #[serde(default)]
    pub expired: bool,
    /// The linked metadata document, when it could be fetched.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<CredentialMetadata>,
    /// Diagnostic message for `Invalid` verdicts, distinguishing
    /// "token does not exist" from "fetch failed" from "malformed".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

/// Resolve the status of a token id against live chain state.
///
/// The four ledger reads are independent and run concurrently; all must
/// complete before the verdict is computed. Failures never propagate as
/// errors — they become an `Invalid` verdict with a distinguishing
/// diagnostic.
pub async fn resolve(ledger: &LedgerClient, pin: &PinClient, token_id: TokenId) -> VerificationReport {
    let (owner, uri, revoked, expired) = tokio::join!(
        ledger.owner_of(token_id),
        ledger.token_uri(token_id),
        ledger.is_revoked(token_id),
        ledger.is_expired(token_id),
    );

    let chain = owner.and_then(|owner| {
        Ok((owner, uri?, revoked?, expired?))
    });

    let (owner, uri, revoked, expired) = match chain {
        Ok(parts) => parts,
        Err(e) => return invalid_from_ledger(token_id, e),
    };

    let metadata = match pin.fetch_metadata(&uri).await {
        Ok(doc) => doc,
        Err(e) => {
            return VerificationReport {
                token_id,
                verdict: Verdict::Invalid,
                owner: Some(owner),
                revoked,
                expired,
                metadata: None,
                diagnostic: Some(metadata_diagnostic(&e)),
            }
        }
    };

    // Revoked takes precedence over expired.
    let verdict = if revoked {
        Verdict::Revoked
    } else if expired {
        Verdict::Expired
    } else {
        Verdict::Active
    };

    VerificationReport {
        token_id,
        verdict,
        owner: Some(owner),
        revoked,
        expired,
        metadata: Some(metadata),
        diagnostic: None,
    }
}

fn invalid_from_ledger(token_id: TokenId, err: LedgerError) -> VerificationReport {
    let diagnostic = match &err {
        LedgerError::TokenNotFound(id) => {
            format!("token {id} does not exist on the ledger")
        }
        other => format!("ledger read failed: {other}"),
    };
    tracing::debug!(%token_id, %diagnostic, "verification resolved to Invalid");
    VerificationReport {
        token_id,
        verdict: Verdict::Invalid,
        owner: None,
        revoked: false,
        expired: false,
        metadata: None,
        diagnostic: Some(diagnostic),
    }
}

/// Distinguish metadata failure modes in the diagnostic message.
fn metadata_diagnostic(err: &PinError) -> String {
    match err {
        PinError::Http { .. } => format!("metadata fetch failed: {err}"),
        PinError::Api { status, .. } => {
            format!("metadata fetch failed with HTTP {status}")
        }
        PinError::Deserialization { .. } => format!("metadata document is malformed: {err}"),
        PinError::InvalidUri(uri) => format!("token carries an unresolvable metadata URI: {uri}"),
        other => format!("metadata fetch failed: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

/// Errors from the refresh operation.
#[derive(Error, Debug)]
pub enum RefreshError {
    /// No record with the given id.
    #[error("credential record {0} not found")]
    NotFound(Uuid),

    /// The chain read failed; the stored record is unchanged.
    #[error("chain read failed during refresh: {0}")]
    Transaction(#[source] LedgerError),
}

/// Reconcile a stored record's revoked flag from live chain state.
///
/// The fold is monotonic: a chain-side `revoked=true` is written into the
/// store, but a chain-side `false` never clears an already-set flag (the
/// flag is only ever set after an on-chain revoke succeeded, so a clear
/// here would mean re-validating a revoked credential on stale reads).
pub async fn refresh_record(
    state: &AppState,
    ledger: &LedgerClient,
    record_id: Uuid,
) -> Result<CredentialRecord, RefreshError> {
    let record = state
        .records
        .get(&record_id)
        .ok_or(RefreshError::NotFound(record_id))?;

    let on_chain_revoked = ledger
        .is_revoked(record.token_id)
        .await
        .map_err(RefreshError::Transaction)?;

    if on_chain_revoked && !record.revoked {
        tracing::info!(
            %record_id,
            token_id = %record.token_id,
            "refresh found chain-side revocation; folding into store"
        );
        let updated = crate::revocation::mark_revoked(state, record_id).await;
        return Ok(updated.unwrap_or(record));
    }

    Ok(record)
}
