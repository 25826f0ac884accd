//! # Issuance Orchestration
//!
//! The workflow that turns an upload into a persisted credential record:
//!
//! 1. Validate and canonicalize inputs.
//! 2. Resolve the patient profile by wallet address.
//! 3. Pin the document file.
//! 4. Build and pin the metadata document.
//! 5. Mint on the ledger and await confirmation.
//! 6. Extract the assigned token id from the receipt's Transfer event.
//! 7. Persist the credential record.
//!
//! Each step fails fast — no automatic retries, no partial rollback. Steps
//! 6 and 7 are the divergence-sensitive tail: by then the mint has already
//! succeeded on-chain, so their failures are logged at ERROR and surfaced
//! with the minted transaction/token identifiers intact for reconciliation.

use chrono::{NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;

use hcred_core::{TokenId, TxHash, WalletAddress};
use hcred_ipfs::{CredentialMetadata, PinClient, PinError};
use hcred_ledger::{LedgerClient, LedgerError};

use crate::state::{AppState, CredentialRecord, Profile};

/// Input to the issuance workflow.
#[derive(Debug)]
pub struct IssueRequest {
    /// Document title.
    pub title: String,
    /// Date the credential was issued.
    pub issued_date: NaiveDate,
    /// Free-text notes.
    pub description: String,
    /// Optional expiry date.
    pub expiry_date: Option<NaiveDate>,
    /// Patient wallet address as entered by the caller (any case).
    pub patient_wallet: String,
    /// Raw document bytes.
    pub file_bytes: Vec<u8>,
    /// Original filename.
    pub file_name: String,
    /// Declared MIME type of the document.
    pub mime_type: String,
}

/// Issuance workflow errors. One variant per failure mode, each with a
/// distinct user-facing message.
#[derive(Error, Debug)]
pub enum IssueError {
    /// User input failed validation.
    #[error("{0}")]
    Validation(String),

    /// No patient profile is registered for the wallet address.
    #[error("no patient found with wallet address {0}")]
    PatientNotFound(WalletAddress),

    /// The file pin failed; the gateway's message is passed through.
    #[error("file upload failed: {0}")]
    Upload(#[source] PinError),

    /// The metadata pin failed.
    #[error("failed to publish credential metadata: {0}")]
    MetadataPublish(#[source] PinError),

    /// The signing endpoint declined the mint transaction. Recoverable —
    /// the caller may retry; nothing was minted.
    #[error("mint signature request was declined")]
    UserRejected,

    /// The mint transaction failed on-chain or in transport.
    #[error("mint transaction failed: {0}")]
    Transaction(#[source] LedgerError),

    /// The mint confirmed but no Transfer event from the ledger contract
    /// carried a token id. The chain and the record store have diverged.
    #[error("mint transaction {tx_hash} succeeded but no token id could be extracted from its receipt")]
    TokenExtraction {
        /// The confirmed mint transaction.
        tx_hash: TxHash,
    },

    /// The record could not be persisted durably after a successful mint.
    #[error("credential minted as token {token_id} but the record could not be persisted: {message}")]
    Persistence {
        /// The minted token id, for operator reconciliation.
        token_id: TokenId,
        /// The store's error message.
        message: String,
    },
}

/// Run the issuance workflow for an authenticated hospital.
///
/// On success the returned record is in the in-memory store and (when a
/// pool is configured) durably persisted. A `Persistence` error still
/// leaves the record in the in-memory store — the mint cannot be unwound.
pub async fn issue(
    state: &AppState,
    ledger: &LedgerClient,
    pin: &PinClient,
    hospital: &Profile,
    req: IssueRequest,
) -> Result<CredentialRecord, IssueError> {
    // Step 1: validate and canonicalize.
    let patient_wallet = validate(&req)?;

    // Step 2: resolve the patient profile.
    let patient = state
        .find_patient_by_wallet(&patient_wallet)
        .ok_or_else(|| IssueError::PatientNotFound(patient_wallet.clone()))?;

    // Step 3: pin the document file.
    tracing::info!(title = %req.title, patient = %patient_wallet, "issuance 1/4: pinning file");
    let pinned_file = pin
        .pin_file(req.file_bytes, &req.file_name, &req.mime_type)
        .await
        .map_err(IssueError::Upload)?;

    // Step 4: build and pin the metadata document.
    tracing::info!(file_cid = %pinned_file.cid, "issuance 2/4: publishing metadata");
    let metadata = CredentialMetadata {
        title: req.title.clone(),
        issuer: hospital.display_name.clone(),
        issued_date: req.issued_date,
        description: req.description.clone(),
        expiry_date: req.expiry_date,
        mime_type: pinned_file.mime_type.clone(),
        ipfs_file_url: pinned_file.ipfs_file_url.clone(),
        file_cid: pinned_file.cid.clone(),
        owner_wallet: patient_wallet.clone(),
    };
    let pinned_metadata = pin
        .pin_json(&metadata)
        .await
        .map_err(IssueError::MetadataPublish)?;

    // Step 5: mint on the ledger and await confirmation.
    tracing::info!(metadata_cid = %pinned_metadata.cid, "issuance 3/4: minting");
    let receipt = ledger
        .mint_to(&patient_wallet, &pinned_metadata.ipfs_url)
        .await
        .map_err(|e| match e {
            LedgerError::UserRejected => IssueError::UserRejected,
            other => IssueError::Transaction(other),
        })?;

    let tx_hash = receipt
        .tx_hash()
        .map_err(|e| IssueError::Transaction(LedgerError::Deserialization {
            method: "eth_getTransactionReceipt".into(),
            message: e.to_string(),
        }))?;

    // Step 6: extract the assigned token id from the Transfer event.
    let token_id = match receipt.minted_token_id(ledger.contract_address()) {
        Some(id) => id,
        None => {
            tracing::error!(
                %tx_hash,
                contract = %ledger.contract_address(),
                "mint confirmed but no Transfer event carried a token id — \
                 chain and record store have diverged"
            );
            return Err(IssueError::TokenExtraction { tx_hash });
        }
    };

    // Step 7: persist the credential record.
    tracing::info!(%token_id, "issuance 4/4: persisting record");
    let record = CredentialRecord {
        record_id: Uuid::new_v4(),
        patient_id: patient.profile_id,
        hospital_id: hospital.profile_id,
        issuer_name: hospital.display_name.clone(),
        title: req.title,
        issued_date: req.issued_date,
        description: req.description,
        expiry_date: req.expiry_date,
        owner_wallet: patient_wallet,
        token_id,
        tx_hash,
        contract_address: ledger.contract_address().clone(),
        gas_used: receipt.gas_used_value(),
        gas_price: receipt.gas_price_value(),
        file_cid: pinned_file.cid,
        gateway_file_url: pinned_file.gateway_file_url,
        metadata_cid: pinned_metadata.cid,
        gateway_metadata_url: pinned_metadata.gateway_url,
        mime_type: pinned_file.mime_type,
        revoked: false,
        created_at: Utc::now(),
    };

    state.records.insert(record.record_id, record.clone());

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::records::insert(pool, &record).await {
            tracing::error!(
                %token_id,
                record_id = %record.record_id,
                error = %e,
                "record held in memory only — durable persistence failed after a successful mint"
            );
            return Err(IssueError::Persistence {
                token_id,
                message: e.to_string(),
            });
        }
    }

    tracing::info!(%token_id, record_id = %record.record_id, "credential issued");
    Ok(record)
}

/// Step 1: field presence, file constraints, and address canonicalization.
fn validate(req: &IssueRequest) -> Result<WalletAddress, IssueError> {
    if req.title.trim().is_empty() {
        return Err(IssueError::Validation("title must not be empty".into()));
    }
    if req.file_bytes.is_empty() {
        return Err(IssueError::Validation("a document file is required".into()));
    }
    if req.file_bytes.len() > hcred_ipfs::MAX_FILE_BYTES {
        return Err(IssueError::Validation(format!(
            "file of {} bytes exceeds the {}-byte limit",
            req.file_bytes.len(),
            hcred_ipfs::MAX_FILE_BYTES
        )));
    }
    if !hcred_ipfs::is_allowed_mime(&req.mime_type) {
        return Err(IssueError::Validation(format!(
            "unsupported file type \"{}\" — only JPEG, PNG, and PDF are accepted",
            req.mime_type
        )));
    }
    if let Some(expiry) = req.expiry_date {
        if expiry < req.issued_date {
            return Err(IssueError::Validation(
                "expiry date must not precede the issued date".into(),
            ));
        }
    }

    WalletAddress::new(&req.patient_wallet)
        .map_err(|e| IssueError::Validation(e.to_string()))
}
