//! # Ledger-view Reconstruction
//!
//! Presents a caller's credential records as a chain-styled list: each
//! entry is annotated with the transaction hash of the adjacently older
//! record as its "previous hash".
//!
//! This is NOT a hash chain. The linkage is purely cosmetic adjacency over
//! the issuance ordering, carries no cryptographic guarantee, and must not
//! be treated as tamper-evidence. The transaction hashes themselves are
//! real (they identify the mint transactions), but nothing binds one
//! record's content to the next.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use hcred_core::{is_expired, TxHash};

use crate::state::CredentialRecord;

/// One entry in the reconstructed ledger view.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LedgerViewEntry {
    /// The underlying credential record.
    pub record: CredentialRecord,
    /// Transaction hash of the adjacently older record, if any. Display
    /// decoration only — see the module docs.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub previous_hash: Option<TxHash>,
    /// Display-side expiry annotation computed from the stored expiry
    /// date. The ledger's own expiry check remains authoritative for
    /// verification verdicts.
    pub display_expired: bool,
}

/// Build the ledger view: records sorted newest-first, each linked to the
/// transaction hash of the next older record.
pub fn build_ledger_view(mut records: Vec<CredentialRecord>) -> Vec<LedgerViewEntry> {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    (0..records.len())
        .map(|i| {
            let previous_hash = records.get(i + 1).map(|older| older.tx_hash.clone());
            let record = records[i].clone();
            LedgerViewEntry {
                display_expired: is_expired(record.expiry_date),
                previous_hash,
                record,
            }
        })
        .collect()
}
