use std::sync::atomic::{AtomicBool, Ordering};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::storage::StorageError;
use sea_orm::DbErr;

pub use common::api::ErrorEnvelope as ErrorBody;

static EXPOSE_DETAIL: AtomicBool = AtomicBool::new(false);

/// Attach internal error detail to 5xx bodies. Set once at startup from
/// `server.environment`.
pub fn expose_error_detail(enabled: bool) {
    EXPOSE_DETAIL.store(enabled, Ordering::Relaxed);
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    TokenMissing,
    TokenInvalid,
    InvalidCredentials,
    NotFound(String),
    Conflict(String),
    PayloadTooLarge(String),
    /// The media host failed.
    Upstream(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        let detail = EXPOSE_DETAIL.load(Ordering::Relaxed);
        let body = |code: &str, message: String, error: Option<String>| ErrorBody {
            success: false,
            code: code.to_string(),
            message,
            error: error.filter(|_| detail),
        };

        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                body("VALIDATION_ERROR", msg, None),
            ),
            AppError::TokenMissing => (
                StatusCode::UNAUTHORIZED,
                body("TOKEN_MISSING", "Authentication required".into(), None),
            ),
            AppError::TokenInvalid => (
                StatusCode::UNAUTHORIZED,
                body("TOKEN_INVALID", "Invalid or expired token".into(), None),
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                body(
                    "INVALID_CREDENTIALS",
                    "Invalid username or password".into(),
                    None,
                ),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, body("NOT_FOUND", msg, None)),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, body("CONFLICT", msg, None)),
            AppError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                body("PAYLOAD_TOO_LARGE", msg, None),
            ),
            AppError::Upstream(detail) => {
                tracing::error!("Media host error: {}", detail);
                (
                    StatusCode::BAD_GATEWAY,
                    body(
                        "UPSTREAM_ERROR",
                        "Media storage is unavailable".into(),
                        Some(detail),
                    ),
                )
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    body(
                        "INTERNAL_ERROR",
                        "An unexpected error occurred".into(),
                        Some(detail),
                    ),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(_) => AppError::NotFound("Media not found".into()),
            StorageError::InvalidPublicId(msg) => AppError::Validation(msg),
            StorageError::UnsupportedType(_) => {
                AppError::Validation("Only image files are allowed".into())
            }
            StorageError::SizeLimitExceeded { limit, .. } => AppError::PayloadTooLarge(format!(
                "File is too large (limit {} KiB)",
                limit / 1024
            )),
            StorageError::Io(e) => AppError::Upstream(e.to_string()),
        }
    }
}
