//! API error types with HTTP response mapping.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{AccessError, AuthError, DomainError, OrderError};
use reporting::ReportError;
use store::StoreError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed request body.
    BadRequest(String),
    /// Domain logic error.
    Domain(DomainError),
    /// Report building error.
    Report(ReportError),
    /// Session backend error.
    Session(tower_sessions::session::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Domain(err) => domain_error_to_response(err),
            ApiError::Report(ReportError::Domain(err)) => domain_error_to_response(err),
            ApiError::Report(err) => internal(err.to_string()),
            ApiError::Session(err) => internal(err.to_string()),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn domain_error_to_response(err: DomainError) -> (StatusCode, String) {
    match &err {
        DomainError::Access(AccessError::Unauthorized) => {
            (StatusCode::UNAUTHORIZED, AccessError::Unauthorized.to_string())
        }
        DomainError::Access(AccessError::Forbidden) => {
            (StatusCode::FORBIDDEN, AccessError::Forbidden.to_string())
        }
        DomainError::Auth(AuthError::InvalidCredentials) => {
            (StatusCode::UNAUTHORIZED, AuthError::InvalidCredentials.to_string())
        }
        DomainError::Order(order_err) => match order_err {
            OrderError::ItemNotFound(_) => (StatusCode::NOT_FOUND, order_err.to_string()),
            OrderError::EmptyCart
            | OrderError::InvalidQuantity { .. }
            | OrderError::AmountOverflow { .. }
            | OrderError::InvalidItem(_) => (StatusCode::BAD_REQUEST, order_err.to_string()),
        },
        DomainError::Store(
            store_err @ (StoreError::ItemAlreadyExists(_) | StoreError::UserAlreadyExists(_)),
        ) => (StatusCode::CONFLICT, store_err.to_string()),
        _ => internal(err.to_string()),
    }
}

fn internal(message: String) -> (StatusCode, String) {
    tracing::error!(error = %message, "internal server error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        ApiError::Report(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<tower_sessions::session::Error> for ApiError {
    fn from(err: tower_sessions::session::Error) -> Self {
        ApiError::Session(err)
    }
}
