//! Credential record persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `records` table.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use hcred_core::{Cid, TokenId, TxHash, WalletAddress};

use crate::state::CredentialRecord;

/// Insert a new credential record.
pub async fn insert(pool: &PgPool, record: &CredentialRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO records (record_id, patient_id, hospital_id, issuer_name, title,
         issued_date, description, expiry_date, owner_wallet, token_id, tx_hash,
         contract_address, gas_used, gas_price, file_cid, gateway_file_url,
         metadata_cid, gateway_metadata_url, mime_type, revoked, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
                 $12, $13, $14, $15, $16, $17, $18, $19, $20, $21)",
    )
    .bind(record.record_id)
    .bind(record.patient_id)
    .bind(record.hospital_id)
    .bind(&record.issuer_name)
    .bind(&record.title)
    .bind(record.issued_date)
    .bind(&record.description)
    .bind(record.expiry_date)
    .bind(record.owner_wallet.as_str())
    .bind(record.token_id.value() as i64)
    .bind(record.tx_hash.as_str())
    .bind(record.contract_address.as_str())
    .bind(record.gas_used.map(|g| g as i64))
    .bind(record.gas_price.map(|g| g as i64))
    .bind(record.file_cid.as_str())
    .bind(&record.gateway_file_url)
    .bind(record.metadata_cid.as_str())
    .bind(&record.gateway_metadata_url)
    .bind(&record.mime_type)
    .bind(record.revoked)
    .bind(record.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Set the revoked flag. Monotonic — there is no clearing counterpart.
pub async fn mark_revoked(pool: &PgPool, record_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE records SET revoked = TRUE WHERE record_id = $1")
        .bind(record_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Load all records from the database into the in-memory store on startup.
///
/// Rows that fail domain validation (corrupt addresses or identifiers) are
/// skipped with a warning rather than aborting the hydration.
pub async fn load_all(pool: &PgPool) -> Result<Vec<CredentialRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, RecordRow>(
        "SELECT record_id, patient_id, hospital_id, issuer_name, title, issued_date,
         description, expiry_date, owner_wallet, token_id, tx_hash, contract_address,
         gas_used, gas_price, file_cid, gateway_file_url, metadata_cid,
         gateway_metadata_url, mime_type, revoked, created_at
         FROM records ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .filter_map(|row| {
            let id = row.record_id;
            match row.into_record() {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(record_id = %id, error = %e, "skipping corrupt record row");
                    None
                }
            }
        })
        .collect())
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct RecordRow {
    record_id: Uuid,
    patient_id: Uuid,
    hospital_id: Uuid,
    issuer_name: String,
    title: String,
    issued_date: NaiveDate,
    description: String,
    expiry_date: Option<NaiveDate>,
    owner_wallet: String,
    token_id: i64,
    tx_hash: String,
    contract_address: String,
    gas_used: Option<i64>,
    gas_price: Option<i64>,
    file_cid: String,
    gateway_file_url: String,
    metadata_cid: String,
    gateway_metadata_url: String,
    mime_type: String,
    revoked: bool,
    created_at: DateTime<Utc>,
}

impl RecordRow {
    fn into_record(self) -> Result<CredentialRecord, String> {
        Ok(CredentialRecord {
            record_id: self.record_id,
            patient_id: self.patient_id,
            hospital_id: self.hospital_id,
            issuer_name: self.issuer_name,
            title: self.title,
            issued_date: self.issued_date,
            description: self.description,
            expiry_date: self.expiry_date,
            owner_wallet: WalletAddress::new(&self.owner_wallet).map_err(|e| e.to_string())?,
            token_id: TokenId::new(
                u64::try_from(self.token_id).map_err(|_| "negative token_id".to_string())?,
            ),
            tx_hash: TxHash::new(&self.tx_hash).map_err(|e| e.to_string())?,
            contract_address: WalletAddress::new(&self.contract_address)
                .map_err(|e| e.to_string())?,
            gas_used: self.gas_used.map(|g| g as u64),
            gas_price: self.gas_price.map(|g| g as u64),
            file_cid: Cid::new(self.file_cid).map_err(|e| e.to_string())?,
            gateway_file_url: self.gateway_file_url,
            metadata_cid: Cid::new(self.metadata_cid).map_err(|e| e.to_string())?,
            gateway_metadata_url: self.gateway_metadata_url,
            mime_type: self.mime_type,
            revoked: self.revoked,
            created_at: self.created_at,
        })
    }
}
