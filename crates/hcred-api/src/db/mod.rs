//! # Database Persistence
//!
//! Optional Postgres persistence behind the in-memory stores. When
//! `DATABASE_URL` is set, every write also lands durably here and the
//! in-memory stores are hydrated from these tables on startup. When it is
//! not set, the API runs in in-memory-only mode.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub mod profiles;
pub mod records;

/// Initialize the connection pool from `DATABASE_URL`, if configured.
///
/// Returns `Ok(None)` when no database is configured (in-memory-only mode).
/// Ensures the schema exists before returning the pool.
pub async fn init_pool() -> Result<Option<PgPool>, sqlx::Error> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::info!("DATABASE_URL not set — running in in-memory-only mode");
            return Ok(None);
        }
    };

    let pool = PgPoolOptions::new().max_connections(8).connect(&url).await?;
    ensure_schema(&pool).await?;
    tracing::info!("database pool initialized");
    Ok(Some(pool))
}

/// Create the tables and indexes if they do not exist yet.
async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS profiles (
            profile_id UUID PRIMARY KEY,
            role TEXT NOT NULL,
            display_name TEXT NOT NULL,
            wallet_address TEXT,
            license_number TEXT,
            created_at TIMESTAMPTZ NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS records (
            record_id UUID PRIMARY KEY,
            patient_id UUID NOT NULL,
            hospital_id UUID NOT NULL,
            issuer_name TEXT NOT NULL,
            title TEXT NOT NULL,
            issued_date DATE NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            expiry_date DATE,
            owner_wallet TEXT NOT NULL,
            token_id BIGINT NOT NULL,
            tx_hash TEXT NOT NULL,
            contract_address TEXT NOT NULL,
            gas_used BIGINT,
            gas_price BIGINT,
            file_cid TEXT NOT NULL,
            gateway_file_url TEXT NOT NULL,
            metadata_cid TEXT NOT NULL,
            gateway_metadata_url TEXT NOT NULL,
            mime_type TEXT NOT NULL,
            revoked BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMPTZ NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_records_hospital
         ON records (hospital_id, created_at DESC)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_records_patient
         ON records (patient_id, created_at DESC)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
