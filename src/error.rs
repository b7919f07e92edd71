//! The error taxonomy for the auth service and its single HTTP mapping.
//!
//! Every fallible operation returns an [`AuthError`]; the conversion to a
//! status code and JSON body happens exactly once, in the `IntoResponse`
//! impl. Internal failures are logged here and never leak their text to the
//! client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// One violated field in a validation failure.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// Client sent malformed input; carries one message per violated field.
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    /// A user with the requested email or username already exists.
    #[error("user already exists")]
    Conflict,
    /// Unknown email or wrong password. Deliberately one variant so the two
    /// cases are indistinguishable to the caller.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// No bearer token was presented on a protected route.
    #[error("access token required")]
    MissingToken,
    /// A token was presented but its signature, payload or expiry is bad.
    #[error("invalid or expired token")]
    InvalidToken,
    /// The authenticated identity no longer resolves to a stored record.
    #[error("user not found")]
    NotFound,
    /// The signing secret is absent. A deployment defect, not client fault.
    #[error("auth service is not properly configured")]
    Misconfigured,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

impl From<crate::auth::jwt::TokenError> for AuthError {
    fn from(err: crate::auth::jwt::TokenError) -> Self {
        use crate::auth::jwt::TokenError;
        match err {
            TokenError::InvalidOrExpired => AuthError::InvalidToken,
            TokenError::Misconfigured => AuthError::Misconfigured,
            TokenError::Other(source) => AuthError::Internal(source),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a [FieldError]>,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error, message, details) = match &self {
            AuthError::Validation(details) => (
                StatusCode::BAD_REQUEST,
                "Validation error",
                "Invalid input data",
                Some(details.as_slice()),
            ),
            AuthError::Conflict => (
                StatusCode::CONFLICT,
                "User already exists",
                "A user with this email or username already exists",
                None,
            ),
            AuthError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid credentials",
                "Email or password is incorrect",
                None,
            ),
            AuthError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "Access token required",
                "Please provide a valid access token in the Authorization header",
                None,
            ),
            AuthError::InvalidToken => (
                StatusCode::FORBIDDEN,
                "Invalid token",
                "The provided token is invalid or expired",
                None,
            ),
            AuthError::NotFound => (
                StatusCode::NOT_FOUND,
                "User not found",
                "User account no longer exists",
                None,
            ),
            AuthError::Misconfigured => {
                error!("signing secret missing; check JWT_SECRET");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server configuration error",
                    "Authentication service is not properly configured",
                    None,
                )
            }
            AuthError::Internal(source) => {
                error!(error = %source, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    "An unexpected error occurred",
                    None,
                )
            }
        };

        let body = Json(ErrorBody {
            error,
            message,
            details,
        });
        (status, body).into_response()
    }
}
