//! Error types for the server.
//!
//! Domain errors from the libraries are mapped to HTTP responses here, and
//! startup failures get their own enum so `main` can report them.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use cloudgate_admin::{AdminError, AdminErrorKind};
use serde::Serialize;
use std::fmt;

/// Admin API failure, rendered as `{ "error": <kind>, "message": <text> }`.
#[derive(Debug)]
pub struct AdminApiError(pub AdminError);

#[derive(Serialize)]
struct ErrorBody {
    error: AdminErrorKind,
    message: String,
}

impl AdminApiError {
    /// Returns the HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self.0.kind() {
            AdminErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
            AdminErrorKind::Forbidden => StatusCode::FORBIDDEN,
            AdminErrorKind::NotFound => StatusCode::NOT_FOUND,
            AdminErrorKind::Conflict => StatusCode::CONFLICT,
            AdminErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<AdminError> for AdminApiError {
    fn from(err: AdminError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AdminApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.0.kind(),
            message: self.0.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Errors that abort server startup.
#[derive(Debug)]
pub enum StartupError {
    /// Configuration could not be loaded.
    Config { details: String },
    /// The listener could not bind.
    Bind { address: String, details: String },
    /// The server stopped with an I/O error.
    Serve { details: String },
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { details } => write!(f, "invalid configuration: {details}"),
            Self::Bind { address, details } => {
                write!(f, "failed to bind to {address}: {details}")
            }
            Self::Serve { details } => write!(f, "server error: {details}"),
        }
    }
}

impl std::error::Error for StartupError {}
