//! # Public Verification Route
//!
//! Unauthenticated, read-only resolution of a token id against live chain
//! state. Mounted outside the auth middleware (like the health probes) so
//! anyone holding a token id can check a credential without credentials of
//! their own — the reads use the public chain endpoint, no signing key.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use hcred_core::TokenId;

use crate::error::AppError;
use crate::state::AppState;
use crate::verification::{self, VerificationReport};

/// Build the public verification router.
pub fn router() -> Router<AppState> {
    Router::new().route("/v1/verify/:token_id", get(verify_token))
}

/// GET /v1/verify/:token_id — Resolve a credential's status.
#[utoipa::path(
    get,
    path = "/v1/verify/{token_id}",
    params(("token_id" = u64, Path, description = "Ledger token ID")),
    responses(
        (status = 200, description = "Verification report (verdict may be INVALID)", body = VerificationReport),
        (status = 422, description = "Token ID is not a non-negative integer", body = crate::error::ErrorBody),
        (status = 503, description = "Chain or pinning client not configured", body = crate::error::ErrorBody),
    ),
    tag = "verify"
)]
pub(crate) async fn verify_token(
    State(state): State<AppState>,
    Path(token_id): Path<String>,
) -> Result<Json<VerificationReport>, AppError> {
    let token_id = TokenId::parse(&token_id)?;
    let ledger = state
        .ledger
        .as_ref()
        .ok_or_else(|| AppError::Unavailable("ledger client is not configured".into()))?;
    let pin = state
        .pin
        .as_ref()
        .ok_or_else(|| AppError::Unavailable("pinning client is not configured".into()))?;

    Ok(Json(verification::resolve(ledger, pin, token_id).await))
}
