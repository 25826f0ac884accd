//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Healthcred API",
        version = "0.3.2",
        description = "Issuance, revocation, and public verification of NFT-backed health credentials.",
        license(name = "BUSL-1.1")
    ),
    paths(
        crate::routes::credentials::issue_credential,
        crate::routes::credentials::list_credentials,
        crate::routes::credentials::ledger_view,
        crate::routes::credentials::get_credential,
        crate::routes::credentials::revoke_credential,
        crate::routes::credentials::refresh_credential,
        crate::routes::profiles::create_profile,
        crate::routes::profiles::get_profile,
        crate::routes::verify::verify_token,
    ),
    components(schemas(
        crate::state::CredentialRecord,
        crate::state::Profile,
        crate::auth::Role,
        crate::ledger_view::LedgerViewEntry,
        crate::verification::Verdict,
        crate::verification::VerificationReport,
        crate::routes::credentials::RevokeResponse,
        crate::routes::profiles::CreateProfileRequest,
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "credentials", description = "Credential issuance and lifecycle"),
        (name = "profiles", description = "Patient and hospital profile registry"),
        (name = "verify", description = "Public credential verification"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
