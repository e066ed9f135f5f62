//! HTTP mapping for the core error taxonomy. The wire shape is always
//! `{"error": "<human-readable message>"}`, matching what the frontend
//! displays verbatim.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use hs_core::AppError;
use serde_json::json;
use tracing::error;

/// Newtype so the foreign [`IntoResponse`] impl can live in this crate.
#[derive(Debug)]
pub struct ApiError(pub AppError);

pub type ApiResult<T> = Result<T, ApiError>;

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self(AppError::Store(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            // Duplicate nickname/rank surface as plain Bad Request to the
            // existing frontend, same as validation misses.
            AppError::Conflict(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::WrongCredential(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = ?self.0, "request failed in the record store");
        }

        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
