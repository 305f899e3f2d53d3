//! HTTP error mapping.

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bloodbank_core::BloodBankError;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors a handler can return.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] BloodBankError),

    #[error("Invalid request body: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Core(BloodBankError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, json!({ "error": msg }))
            }
            ApiError::Core(BloodBankError::InsufficientStock {
                available,
                required,
            }) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "Insufficient stock",
                    "available": available,
                    "required": required,
                    "message": format!(
                        "Only {} units available, {} required",
                        available, required
                    ),
                }),
            ),
            ApiError::Core(BloodBankError::NotFound(what)) => (
                StatusCode::NOT_FOUND,
                json!({ "error": format!("Not found: {}", what) }),
            ),
            ApiError::Core(BloodBankError::InvalidState(msg)) => {
                (StatusCode::BAD_REQUEST, json!({ "error": msg }))
            }
            ApiError::Core(BloodBankError::DonationFailed(cause)) => {
                error!(%cause, "donation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Failed to record donation" }),
                )
            }
            ApiError::Core(BloodBankError::Transaction(cause)) | ApiError::Internal(cause) => {
                error!(%cause, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
        };

        (status, Json(body)).into_response()
    }
}

/// `Json` whose rejections are reported as 400 with an `{error}` body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl<T: Serialize> IntoResponse for ApiJson<T> {
    fn into_response(self) -> Response {
        Json(self.0).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
