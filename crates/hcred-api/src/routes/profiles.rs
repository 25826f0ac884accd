//! # Profile Routes
//!
//! Minimal registry for patient and hospital profiles. The issuance
//! orchestrator resolves patients by wallet address against this store.
//!
//! ## Endpoints
//!
//! - `POST /v1/profiles` — register a profile
//! - `GET /v1/profiles/:id` — get a profile

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use hcred_core::WalletAddress;

use crate::auth::{require_role, CallerIdentity, Role};
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::{AppState, Profile};

/// Request to register a profile.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProfileRequest {
    /// Role of the profile holder: "patient" or "hospital".
    pub role: Role,
    /// Display name (person or hospital).
    pub display_name: String,
    /// Wallet address to bind, in any case (canonicalized on storage).
    #[serde(default)]
    pub wallet_address: Option<String>,
    /// Hospital license number (hospital profiles only).
    #[serde(default)]
    pub license_number: Option<String>,
}

impl Validate for CreateProfileRequest {
    fn validate(&self) -> Result<(), String> {
        if self.display_name.trim().is_empty() {
            return Err("display_name must not be empty".to_string());
        }
        if self.role == Role::Admin {
            return Err("admin profiles cannot be registered via the API".to_string());
        }
        if self.role == Role::Patient && self.wallet_address.is_none() {
            return Err("patient profiles require a wallet_address".to_string());
        }
        Ok(())
    }
}

/// Build the profiles router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/profiles", post(create_profile))
        .route("/v1/profiles/:id", get(get_profile))
}

/// POST /v1/profiles — Register a patient or hospital profile.
#[utoipa::path(
    post,
    path = "/v1/profiles",
    request_body = CreateProfileRequest,
    responses(
        (status = 201, description = "Profile registered", body = Profile),
        (status = 409, description = "Wallet already bound to a patient", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "profiles"
)]
pub(crate) async fn create_profile(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<CreateProfileRequest>, JsonRejection>,
) -> Result<(axum::http::StatusCode, Json<Profile>), AppError> {
    require_role(&caller, Role::Patient)?;
    let req = extract_validated_json(body)?;

    let wallet_address = req
        .wallet_address
        .as_deref()
        .map(WalletAddress::new)
        .transpose()?;

    // One patient per wallet: the issuance lookup must be unambiguous.
    if req.role == Role::Patient {
        if let Some(wallet) = &wallet_address {
            if state.find_patient_by_wallet(wallet).is_some() {
                return Err(AppError::Conflict(format!(
                    "wallet {wallet} is already bound to a patient profile"
                )));
            }
        }
    }

    let profile = Profile {
        profile_id: Uuid::new_v4(),
        role: req.role,
        display_name: req.display_name,
        wallet_address,
        license_number: req.license_number,
        created_at: Utc::now(),
    };

    state.profiles.insert(profile.profile_id, profile.clone());

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::profiles::insert(pool, &profile).await {
            tracing::error!(profile_id = %profile.profile_id, error = %e, "profile persisted in memory only");
            return Err(AppError::Internal(e.to_string()));
        }
    }

    tracing::info!(profile_id = %profile.profile_id, role = profile.role.as_str(), "profile registered");
    Ok((axum::http::StatusCode::CREATED, Json(profile)))
}

/// GET /v1/profiles/:id — Get a profile.
#[utoipa::path(
    get,
    path = "/v1/profiles/{id}",
    params(("id" = Uuid, Path, description = "Profile ID")),
    responses(
        (status = 200, description = "Profile found", body = Profile),
        (status = 404, description = "Profile not found", body = crate::error::ErrorBody),
    ),
    tag = "profiles"
)]
pub(crate) async fn get_profile(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<Profile>, AppError> {
    require_role(&caller, Role::Patient)?;
    state
        .profiles
        .get(&id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("profile {id} not found")))
}
