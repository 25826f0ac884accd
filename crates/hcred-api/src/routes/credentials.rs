//! # Credential Routes
//!
//! Issuance, listing, revocation, refresh, and the ledger view.
//!
//! ## Endpoints
//!
//! - `POST /v1/credentials` — issue (multipart; hospital role)
//! - `GET /v1/credentials` — list caller's records, newest first
//! - `GET /v1/credentials/ledger-view` — caller's records with cosmetic
//!   previous-hash chaining
//! - `GET /v1/credentials/:id` — get one record
//! - `POST /v1/credentials/:id/revoke` — revoke (issuing hospital or admin)
//! - `POST /v1/credentials/:id/refresh` — reconcile stored flags from live
//!   chain state

use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{require_role, CallerIdentity, Role};
use crate::error::AppError;
use crate::issuance::{self, IssueRequest};
use crate::ledger_view::{build_ledger_view, LedgerViewEntry};
use crate::revocation;
use crate::state::{AppState, CredentialRecord, Profile};
use crate::verification;

/// Response to a revocation request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RevokeResponse {
    /// The record after the operation.
    pub record: CredentialRecord,
    /// True when the token was already revoked and this call was a no-op.
    pub already_revoked: bool,
}

/// Build the credentials router.
///
/// The issuance route accepts multipart bodies up to slightly above the
/// 10 MB file cap (headroom for the form fields themselves).
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/credentials",
            get(list_credentials).post(issue_credential),
        )
        .route("/v1/credentials/ledger-view", get(ledger_view))
        .route("/v1/credentials/:id", get(get_credential))
        .route("/v1/credentials/:id/revoke", post(revoke_credential))
        .route("/v1/credentials/:id/refresh", post(refresh_credential))
        .layer(DefaultBodyLimit::max(11 * 1024 * 1024))
}

/// Resolve the configured external clients, or fail with 503.
fn require_clients(
    state: &AppState,
) -> Result<(&hcred_ledger::LedgerClient, &hcred_ipfs::PinClient), AppError> {
    let ledger = state
        .ledger
        .as_ref()
        .ok_or_else(|| AppError::Unavailable("ledger client is not configured".into()))?;
    let pin = state
        .pin
        .as_ref()
        .ok_or_else(|| AppError::Unavailable("pinning client is not configured".into()))?;
    Ok((ledger, pin))
}

/// Resolve the caller's hospital profile for issuance/revocation context.
fn require_hospital_profile(
    state: &AppState,
    caller: &CallerIdentity,
) -> Result<Profile, AppError> {
    let profile_id = caller.profile_id.ok_or_else(|| {
        AppError::Forbidden("a hospital profile binding is required for this operation".into())
    })?;
    let profile = state
        .profiles
        .get(&profile_id)
        .ok_or_else(|| AppError::NotFound(format!("profile {profile_id} not found")))?;
    if profile.role != Role::Hospital {
        return Err(AppError::Forbidden(
            "only hospital profiles may issue credentials".into(),
        ));
    }
    Ok(profile)
}

/// Records visible to the caller: issued-by for hospitals, owned-by for
/// patients, everything for admins.
fn visible_records(state: &AppState, caller: &CallerIdentity) -> Vec<CredentialRecord> {
    let mut records = state.records.filter(|r| caller.can_read_record(r));
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    records
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /v1/credentials — Issue a new credential.
///
/// Multipart form: `file` + `title` + `issued_date` + `patient_wallet`
/// (+ optional `description`, `expiry_date`).
#[utoipa::path(
    post,
    path = "/v1/credentials",
    responses(
        (status = 201, description = "Credential issued", body = CredentialRecord),
        (status = 404, description = "No patient with the given wallet", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
        (status = 502, description = "Collaborator failure", body = crate::error::ErrorBody),
    ),
    tag = "credentials"
)]
pub(crate) async fn issue_credential(
    State(state): State<AppState>,
    caller: CallerIdentity,
    multipart: Multipart,
) -> Result<(axum::http::StatusCode, Json<CredentialRecord>), AppError> {
    require_role(&caller, Role::Hospital)?;
    let hospital = require_hospital_profile(&state, &caller)?;
    let (ledger, pin) = require_clients(&state)?;

    let req = parse_issue_multipart(multipart).await?;
    let record = issuance::issue(&state, ledger, pin, &hospital, req).await?;
    Ok((axum::http::StatusCode::CREATED, Json(record)))
}

/// GET /v1/credentials — List the caller's records, newest first.
#[utoipa::path(
    get,
    path = "/v1/credentials",
    responses(
        (status = 200, description = "Caller's credential records", body = Vec<CredentialRecord>),
    ),
    tag = "credentials"
)]
pub(crate) async fn list_credentials(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Json<Vec<CredentialRecord>> {
    Json(visible_records(&state, &caller))
}

/// GET /v1/credentials/ledger-view — Caller's records with cosmetic
/// previous-hash chaining. Decorative only; carries no tamper-evidence.
#[utoipa::path(
    get,
    path = "/v1/credentials/ledger-view",
    responses(
        (status = 200, description = "Chain-styled record listing", body = Vec<LedgerViewEntry>),
    ),
    tag = "credentials"
)]
pub(crate) async fn ledger_view(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Json<Vec<LedgerViewEntry>> {
    Json(build_ledger_view(visible_records(&state, &caller)))
}

/// GET /v1/credentials/:id — Get a single record.
#[utoipa::path(
    get,
    path = "/v1/credentials/{id}",
    params(("id" = Uuid, Path, description = "Record ID")),
    responses(
        (status = 200, description = "Record found", body = CredentialRecord),
        (status = 404, description = "Record not found", body = crate::error::ErrorBody),
    ),
    tag = "credentials"
)]
pub(crate) async fn get_credential(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<CredentialRecord>, AppError> {
    let record = state
        .records
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("credential record {id} not found")))?;
    if !caller.can_read_record(&record) {
        return Err(AppError::Forbidden(
            "caller may not read this credential record".into(),
        ));
    }
    Ok(Json(record))
}

/// POST /v1/credentials/:id/revoke — Revoke a credential.
#[utoipa::path(
    post,
    path = "/v1/credentials/{id}/revoke",
    params(("id" = Uuid, Path, description = "Record ID")),
    responses(
        (status = 200, description = "Revoked (or already revoked)", body = RevokeResponse),
        (status = 403, description = "Not the issuing hospital / not contract owner", body = crate::error::ErrorBody),
        (status = 404, description = "Record not found", body = crate::error::ErrorBody),
    ),
    tag = "credentials"
)]
pub(crate) async fn revoke_credential(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<RevokeResponse>, AppError> {
    require_role(&caller, Role::Hospital)?;
    let record = state
        .records
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("credential record {id} not found")))?;
    if !caller.can_administer_record(&record) {
        return Err(AppError::Forbidden(
            "only the issuing hospital may revoke this credential".into(),
        ));
    }
    let ledger = state
        .ledger
        .as_ref()
        .ok_or_else(|| AppError::Unavailable("ledger client is not configured".into()))?;

    let outcome = revocation::revoke(&state, ledger, id).await?;
    Ok(Json(RevokeResponse {
        already_revoked: outcome.was_already_revoked(),
        record: outcome.record().clone(),
    }))
}

/// POST /v1/credentials/:id/refresh — Reconcile stored flags from live
/// chain state. The fold is monotonic: a chain-side revocation is written
/// into the store, never the reverse.
#[utoipa::path(
    post,
    path = "/v1/credentials/{id}/refresh",
    params(("id" = Uuid, Path, description = "Record ID")),
    responses(
        (status = 200, description = "Record after reconciliation", body = CredentialRecord),
        (status = 404, description = "Record not found", body = crate::error::ErrorBody),
    ),
    tag = "credentials"
)]
pub(crate) async fn refresh_credential(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<CredentialRecord>, AppError> {
    require_role(&caller, Role::Hospital)?;
    let record = state
        .records
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("credential record {id} not found")))?;
    if !caller.can_administer_record(&record) {
        return Err(AppError::Forbidden(
            "only the issuing hospital may refresh this credential".into(),
        ));
    }
    let ledger = state
        .ledger
        .as_ref()
        .ok_or_else(|| AppError::Unavailable("ledger client is not configured".into()))?;

    let record = verification::refresh_record(&state, ledger, id)
        .await
        .map_err(|e| match e {
            verification::RefreshError::NotFound(id) => {
                AppError::NotFound(format!("credential record {id} not found"))
            }
            verification::RefreshError::Transaction(err) => AppError::Upstream(err.to_string()),
        })?;
    Ok(Json(record))
}

// ── Multipart parsing ───────────────────────────────────────────────

/// Assemble an [`IssueRequest`] from a multipart form.
///
/// Expected parts: `file` (binary, with filename and content type),
/// `title`, `issued_date` (`YYYY-MM-DD`), `patient_wallet`, and optional
/// `description` / `expiry_date`.
async fn parse_issue_multipart(mut multipart: Multipart) -> Result<IssueRequest, AppError> {
    let mut title = None;
    let mut issued_date = None;
    let mut description = String::new();
    let mut expiry_date = None;
    let mut patient_wallet = None;
    let mut file: Option<(Vec<u8>, String, String)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("document").to_string();
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("failed to read file part: {e}")))?;
                file = Some((bytes.to_vec(), file_name, mime_type));
            }
            "title" => title = Some(read_text(field, "title").await?),
            "issued_date" => {
                issued_date = Some(parse_date(&read_text(field, "issued_date").await?, "issued_date")?)
            }
            "description" => description = read_text(field, "description").await?,
            "expiry_date" => {
                let raw = read_text(field, "expiry_date").await?;
                if !raw.trim().is_empty() {
                    expiry_date = Some(parse_date(&raw, "expiry_date")?);
                }
            }
            "patient_wallet" => patient_wallet = Some(read_text(field, "patient_wallet").await?),
            other => {
                tracing::debug!(field = other, "ignoring unknown multipart field");
            }
        }
    }

    let (file_bytes, file_name, mime_type) =
        file.ok_or_else(|| AppError::Validation("a document file is required".into()))?;

    Ok(IssueRequest {
        title: title.ok_or_else(|| AppError::Validation("title is required".into()))?,
        issued_date: issued_date
            .ok_or_else(|| AppError::Validation("issued_date is required".into()))?,
        description,
        expiry_date,
        patient_wallet: patient_wallet
            .ok_or_else(|| AppError::Validation("patient_wallet is required".into()))?,
        file_bytes,
        file_name,
        mime_type,
    })
}

async fn read_text(field: axum::extract::multipart::Field<'_>, name: &str) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("failed to read {name} field: {e}")))
}

fn parse_date(raw: &str, field: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| AppError::Validation(format!("invalid {field} \"{raw}\": {e}")))
}
