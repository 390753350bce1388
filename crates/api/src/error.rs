//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use saga::{BusinessError, CheckoutError};

/// API-level error type that maps to HTTP responses.
///
/// Every response body has the shape `{"error": <code>, "message": <text>}`.
/// Business rejections carry their full message; system failures carry only
/// the generic refund notice, never the internal cause.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or invalid credentials.
    Unauthorized,
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Checkout outcome from the saga.
    Checkout(CheckoutError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "missing or invalid credentials".to_string(),
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Checkout(err) => checkout_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "internal server error".to_string(),
                )
            }
        };

        let body = serde_json::json!({ "error": code, "message": message });
        (status, axum::Json(body)).into_response()
    }
}

fn checkout_error_to_response(err: CheckoutError) -> (StatusCode, &'static str, String) {
    match &err {
        CheckoutError::Business(business) => {
            let status = match business {
                BusinessError::CartEmpty | BusinessError::TourUnavailable { .. } => {
                    StatusCode::BAD_REQUEST
                }
                BusinessError::TourNotFound { .. } => StatusCode::NOT_FOUND,
                BusinessError::DuplicatePurchase { .. } => StatusCode::CONFLICT,
                BusinessError::PaymentDeclined { .. } => StatusCode::PAYMENT_REQUIRED,
            };
            (status, business.code(), business.to_string())
        }
        CheckoutError::System => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "system_failure",
            err.to_string(),
        ),
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}
