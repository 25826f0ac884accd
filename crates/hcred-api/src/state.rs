//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers via
//! the `State` extractor.
//!
//! ## Architecture
//!
//! AppState holds the record store (a denormalized cache of ledger truth),
//! the profile registry, and the typed clients for the two external
//! collaborators: the credential ledger contract and the pinning service.
//! The ledger remains the source of truth for revoked/expired status; the
//! record store is the source of truth for human-facing convenience fields.
//!
//! When a Postgres pool is configured, records and profiles are also
//! persisted durably and hydrated back into the in-memory stores on
//! startup. Without a pool the API runs in in-memory-only mode.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

use hcred_core::{Cid, TokenId, TxHash, WalletAddress};

use crate::auth::Role;

// -- Generic In-Memory Store --------------------------------------------------

/// Thread-safe, cloneable in-memory key-value store.
///
/// All operations are synchronous (the RwLock is `parking_lot`, not
/// `tokio::sync`) because the lock is never held across `.await` points.
/// `parking_lot::RwLock` is non-poisonable — a panicking writer does not
/// permanently corrupt the store.
#[derive(Debug)]
pub struct Store<T: Clone + Send + Sync> {
    data: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T: Clone + Send + Sync> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<T: Clone + Send + Sync> Store<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, id: Uuid, value: T) -> Option<T> {
        self.data.write().insert(id, value)
    }

    /// Retrieve a record by ID.
    pub fn get(&self, id: &Uuid) -> Option<T> {
        self.data.read().get(id).cloned()
    }

    /// List all records.
    pub fn list(&self) -> Vec<T> {
        self.data.read().values().cloned().collect()
    }

    /// List records matching a predicate.
    pub fn filter(&self, pred: impl Fn(&T) -> bool) -> Vec<T> {
        self.data
            .read()
            .values()
            .filter(|v| pred(v))
            .cloned()
            .collect()
    }

    /// Find the first record matching a predicate.
    pub fn find(&self, pred: impl Fn(&T) -> bool) -> Option<T> {
        self.data.read().values().find(|v| pred(v)).cloned()
    }

    /// Update a record in place. Returns the updated record, or `None` if
    /// not found.
    pub fn update(&self, id: &Uuid, f: impl FnOnce(&mut T)) -> Option<T> {
        let mut guard = self.data.write();
        if let Some(entry) = guard.get_mut(id) {
            f(entry);
            Some(entry.clone())
        } else {
            None
        }
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + Send + Sync> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

// -- Record Types -------------------------------------------------------------

/// A persisted credential record — one row per issued credential.
///
/// Denormalized cache of ledger truth: `token_id` is assigned by the ledger
/// and immutable once minted; `revoked` only transitions false→true, set
/// after the on-chain revoke succeeds (or folded in from a chain read by
/// the refresh operation).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CredentialRecord {
    /// Unique record identifier.
    pub record_id: Uuid,
    /// Profile of the patient holding the credential.
    pub patient_id: Uuid,
    /// Profile of the hospital that issued the credential.
    pub hospital_id: Uuid,
    /// Issuing hospital's display name at issuance time.
    pub issuer_name: String,
    /// Document title.
    pub title: String,
    /// Date the credential was issued.
    pub issued_date: NaiveDate,
    /// Free-text notes.
    #[serde(default)]
    pub description: String,
    /// Optional expiry date. Absent means the credential never expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
    /// Canonical wallet address of the credential holder.
    #[schema(value_type = String)]
    pub owner_wallet: WalletAddress,
    /// Ledger-assigned token identifier.
    #[schema(value_type = u64)]
    pub token_id: TokenId,
    /// Hash of the mint transaction.
    #[schema(value_type = String)]
    pub tx_hash: TxHash,
    /// Address of the ledger contract the token lives on.
    #[schema(value_type = String)]
    pub contract_address: WalletAddress,
    /// Gas consumed by the mint transaction, when reported.
    #[serde(default)]
    pub gas_used: Option<u64>,
    /// Effective gas price of the mint transaction, when reported.
    #[serde(default)]
    pub gas_price: Option<u64>,
    /// Content identifier of the pinned document file.
    #[schema(value_type = String)]
    pub file_cid: Cid,
    /// Gateway URL of the document file.
    pub gateway_file_url: String,
    /// Content identifier of the pinned metadata document.
    #[schema(value_type = String)]
    pub metadata_cid: Cid,
    /// Gateway URL of the metadata document.
    pub gateway_metadata_url: String,
    /// MIME type of the document file.
    pub mime_type: String,
    /// Whether the credential has been revoked. Monotonic: never reverses.
    #[serde(default)]
    pub revoked: bool,
    /// When the record was persisted.
    pub created_at: DateTime<Utc>,
}

/// A patient or hospital profile.
///
/// Minimal registry entry: the issuance orchestrator resolves patients by
/// canonical wallet address against this store.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Profile {
    /// Unique profile identifier.
    pub profile_id: Uuid,
    /// Role of the profile holder.
    pub role: Role,
    /// Display name (person or hospital).
    pub display_name: String,
    /// Canonical wallet address bound to this profile, if connected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub wallet_address: Option<WalletAddress>,
    /// Hospital license number (hospital profiles only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_number: Option<String>,
    /// When the profile was registered.
    pub created_at: DateTime<Utc>,
}

// -- Application State --------------------------------------------------------

/// Application configuration.
///
/// Custom `Debug` redacts the `auth_token` to prevent credential leakage
/// in logs.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Static bearer token secret. If `None`, authentication is disabled.
    pub auth_token: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_token: None,
        }
    }
}

/// Shared application state accessible to all route handlers.
///
/// Clone-friendly via `Arc` internals in each `Store`. The ledger and
/// pinning clients are optional: when absent (not configured), the routes
/// that need them return 503.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Issued credential records.
    pub records: Store<CredentialRecord>,
    /// Patient and hospital profiles.
    pub profiles: Store<Profile>,
    /// PostgreSQL connection pool for durable persistence. When `None`,
    /// the API operates in in-memory-only mode.
    pub db_pool: Option<PgPool>,
    /// Typed client for the credential ledger contract.
    pub ledger: Option<hcred_ledger::LedgerClient>,
    /// Typed client for the pinning service and gateway.
    pub pin: Option<hcred_ipfs::PinClient>,
    /// Application configuration.
    pub config: AppConfig,
}

impl AppState {
    /// Create a new application state with default configuration and no
    /// external clients.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default(), None, None, None)
    }

    /// Create a new application state with the given configuration and
    /// optional clients.
    pub fn with_config(
        config: AppConfig,
        ledger: Option<hcred_ledger::LedgerClient>,
        pin: Option<hcred_ipfs::PinClient>,
        db_pool: Option<PgPool>,
    ) -> Self {
        Self {
            records: Store::new(),
            profiles: Store::new(),
            db_pool,
            ledger,
            pin,
            config,
        }
    }

    /// Look up a patient profile by canonical wallet address.
    pub fn find_patient_by_wallet(&self, wallet: &WalletAddress) -> Option<Profile> {
        self.profiles.find(|p| {
            p.role == Role::Patient && p.wallet_address.as_ref() == Some(wallet)
        })
    }

    /// Hydrate in-memory stores from the database.
    ///
    /// Called once on startup when a database pool is available, so that
    /// read operations remain fast and synchronous afterwards.
    pub async fn hydrate_from_db(&self) -> Result<(), String> {
        let pool = match &self.db_pool {
            Some(pool) => pool,
            None => return Ok(()),
        };

        let profiles = crate::db::profiles::load_all(pool)
            .await
            .map_err(|e| format!("failed to load profiles: {e}"))?;
        let profile_count = profiles.len();
        for profile in profiles {
            self.profiles.insert(profile.profile_id, profile);
        }

        let records = crate::db::records::load_all(pool)
            .await
            .map_err(|e| format!("failed to load records: {e}"))?;
        let record_count = records.len();
        for record in records {
            self.records.insert(record.record_id, record);
        }

        tracing::info!(
            profiles = profile_count,
            records = record_count,
            "hydrated in-memory stores from database"
        );

        Ok(())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
