//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps workflow errors from the orchestrators to HTTP status codes and
//! JSON error bodies with a machine-readable code. Internal error details
//! are never exposed to clients — with one deliberate exception: state
//! divergence between the ledger and the record store is reported with its
//! message intact, because silently swallowing it would hide an
//! on-chain/off-chain inconsistency that requires operator action.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::issuance::IssueError;
use crate::revocation::RevokeError;

/// Structured JSON error response body.
///
/// All error responses use this format for consistency across the API
/// surface.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Authentication failure — missing or invalid token (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authorization failure — insufficient permissions (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Conflict with current resource state (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A required external collaborator failed (502). The collaborator's
    /// message is passed through.
    #[error("upstream failure: {0}")]
    Upstream(String),

    /// A required external client is not configured (503).
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// On-chain/off-chain state divergence (500). Unlike `Internal`, the
    /// message IS returned to the caller — this condition must be surfaced
    /// loudly, never swallowed.
    #[error("state divergence: {0}")]
    StateDivergence(String),

    /// Internal server error (500). Message is logged but not returned to
    /// the client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_FAILURE"),
            Self::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
            Self::StateDivergence(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STATE_DIVERGENCE"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal error messages to clients. State
        // divergence is the exception — see the module docs.
        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        match &self {
            Self::Internal(_) | Self::StateDivergence(_) => {
                tracing::error!(error = %self, "request failed");
            }
            _ => {}
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<hcred_core::ValidationError> for AppError {
    fn from(err: hcred_core::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Map issuance workflow errors to HTTP semantics. Each kind keeps its
/// distinct user-facing message.
impl From<IssueError> for AppError {
    fn from(err: IssueError) -> Self {
        match &err {
            IssueError::Validation(_) => Self::Validation(err.to_string()),
            IssueError::PatientNotFound(_) => Self::NotFound(err.to_string()),
            IssueError::Upload(_) | IssueError::MetadataPublish(_) | IssueError::Transaction(_) => {
                Self::Upstream(err.to_string())
            }
            IssueError::UserRejected => Self::BadRequest(err.to_string()),
            IssueError::TokenExtraction { .. } | IssueError::Persistence { .. } => {
                Self::StateDivergence(err.to_string())
            }
        }
    }
}

/// Map revocation workflow errors to HTTP semantics.
impl From<RevokeError> for AppError {
    fn from(err: RevokeError) -> Self {
        match &err {
            RevokeError::NotFound(_) => Self::NotFound(err.to_string()),
            RevokeError::PermissionDenied => Self::Forbidden(err.to_string()),
            RevokeError::UserRejected => Self::BadRequest(err.to_string()),
            RevokeError::Transaction(_) => Self::Upstream(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn response_parts(err: AppError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[test]
    fn status_codes() {
        let cases: Vec<(AppError, StatusCode, &str)> = vec![
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (
                AppError::Validation("x".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
            ),
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            (AppError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            (AppError::Forbidden("x".into()), StatusCode::FORBIDDEN, "FORBIDDEN"),
            (AppError::Conflict("x".into()), StatusCode::CONFLICT, "CONFLICT"),
            (AppError::Upstream("x".into()), StatusCode::BAD_GATEWAY, "UPSTREAM_FAILURE"),
            (
                AppError::Unavailable("x".into()),
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
            ),
            (
                AppError::StateDivergence("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "STATE_DIVERGENCE",
            ),
            (
                AppError::Internal("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
            ),
        ];
        for (err, status, code) in cases {
            let (s, c) = err.status_and_code();
            assert_eq!(s, status);
            assert_eq!(c, code);
        }
    }

    #[tokio::test]
    async fn internal_hides_details() {
        let (status, body) = response_parts(AppError::Internal("db connection failed".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.error.message.contains("db connection"));
        assert_eq!(body.error.message, "An internal error occurred");
    }

    #[tokio::test]
    async fn state_divergence_keeps_details() {
        let (status, body) = response_parts(AppError::StateDivergence(
            "mint succeeded but token id missing from receipt".into(),
        ))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error.code, "STATE_DIVERGENCE");
        assert!(body.error.message.contains("token id missing"));
    }

    #[tokio::test]
    async fn not_found_carries_message() {
        let (status, body) = response_parts(AppError::NotFound("record 123".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.error.message.contains("record 123"));
    }

    #[test]
    fn validation_error_from_core() {
        let core_err = hcred_core::ValidationError::InvalidWalletAddress("0x12".to_string());
        let app_err = AppError::from(core_err);
        match &app_err {
            AppError::Validation(msg) => assert!(msg.contains("0x12")),
            other => panic!("expected Validation, got: {other:?}"),
        }
    }
}
