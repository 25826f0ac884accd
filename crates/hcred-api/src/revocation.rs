//! # Revocation Orchestration
//!
//! Symmetric to issuance: send the on-chain revoke, then flip the stored
//! flag. The chain is authoritative — the stored flag is only updated after
//! the ledger confirms, and a failed durable write afterwards leaves the
//! system inconsistent until a refresh reconciles it from live chain state
//! (logged at ERROR, not failed).
//!
//! Revoking an already-revoked token is a no-op-with-warning, not a hard
//! failure: the ledger rejects the duplicate, and the stored flag is folded
//! forward to true.

use thiserror::Error;
use uuid::Uuid;

use hcred_ledger::{LedgerClient, LedgerError};

use crate::state::{AppState, CredentialRecord};

/// Outcome of a revocation request.
#[derive(Debug)]
pub enum RevokeOutcome {
    /// The token was revoked by this call.
    Revoked(CredentialRecord),
    /// The token was already revoked; nothing changed on-chain.
    AlreadyRevoked(CredentialRecord),
}

impl RevokeOutcome {
    /// The record after the operation, revoked flag set.
    pub fn record(&self) -> &CredentialRecord {
        match self {
            Self::Revoked(r) | Self::AlreadyRevoked(r) => r,
        }
    }

    /// Whether the call was a duplicate of an earlier revocation.
    pub fn was_already_revoked(&self) -> bool {
        matches!(self, Self::AlreadyRevoked(_))
    }
}

/// Revocation workflow errors.
#[derive(Error, Debug)]
pub enum RevokeError {
    /// No record with the given id.
    #[error("credential record {0} not found")]
    NotFound(Uuid),

    /// The configured sender is not the ledger contract's owner. The
    /// stored flag is left unchanged.
    #[error("revocation denied: the signing identity is not the ledger contract owner")]
    PermissionDenied,

    /// The signing endpoint declined the revoke transaction.
    #[error("revoke signature request was declined")]
    UserRejected,

    /// The revoke transaction failed on-chain or in transport.
    #[error("revoke transaction failed: {0}")]
    Transaction(#[source] LedgerError),
}

/// Run the revocation workflow for a credential record.
pub async fn revoke(
    state: &AppState,
    ledger: &LedgerClient,
    record_id: Uuid,
) -> Result<RevokeOutcome, RevokeError> {
    let record = state
        .records
        .get(&record_id)
        .ok_or(RevokeError::NotFound(record_id))?;

    // The stored flag is only ever set after an on-chain revoke succeeded,
    // so a set flag means the ledger already has the token revoked.
    if record.revoked {
        tracing::warn!(%record_id, token_id = %record.token_id, "revocation requested for already-revoked credential");
        return Ok(RevokeOutcome::AlreadyRevoked(record));
    }

    match ledger.revoke(record.token_id).await {
        Ok(receipt) => {
            tracing::info!(
                %record_id,
                token_id = %record.token_id,
                tx_hash = %receipt.transaction_hash,
                "credential revoked on-chain"
            );
            let updated = mark_revoked(state, record_id).await;
            Ok(RevokeOutcome::Revoked(updated.unwrap_or(record)))
        }
        Err(LedgerError::AlreadyRevoked(token_id)) => {
            // The ledger says revoked but the store said active — fold the
            // chain's answer forward.
            tracing::warn!(%record_id, %token_id, "ledger reports token already revoked; reconciling stored flag");
            let updated = mark_revoked(state, record_id).await;
            Ok(RevokeOutcome::AlreadyRevoked(updated.unwrap_or(record)))
        }
        Err(LedgerError::Unauthorized) => {
            tracing::warn!(%record_id, token_id = %record.token_id, "revocation rejected: sender is not the contract owner");
            Err(RevokeError::PermissionDenied)
        }
        Err(LedgerError::UserRejected) => Err(RevokeError::UserRejected),
        Err(other) => Err(RevokeError::Transaction(other)),
    }
}

/// Set the stored revoked flag (monotonic) in memory and, best-effort,
/// durably. A failed durable write is logged at ERROR and does not fail
/// the operation — the chain has already revoked, and the next refresh
/// reconciles.
pub(crate) async fn mark_revoked(state: &AppState, record_id: Uuid) -> Option<CredentialRecord> {
    let updated = state.records.update(&record_id, |r| r.revoked = true);

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::records::mark_revoked(pool, record_id).await {
            tracing::error!(
                %record_id,
                error = %e,
                "revoked on-chain but durable flag update failed — store inconsistent until next refresh"
            );
        }
    }

    updated
}
